//! Geometric transforms that allocate a new image and leave the source
//! untouched.
//!
//! Results share the source's access counter. Every output pixel costs one
//! read from the source and one write to the result.

use gm_core::{Error, GrayImage};

/// Rotates 90 degrees counter-clockwise.
///
/// Source pixel `(x, y)` lands at `(y, width - 1 - x)`.
pub fn rotate_ccw(src: &GrayImage) -> Result<GrayImage, Error> {
    let (w, h) = (src.width(), src.height());
    let mut out = GrayImage::with_counter(h, w, src.maxval(), src.counter())?;

    for y in 0..h {
        for x in 0..w {
            out.set(y, w - 1 - x, src.get(x, y));
        }
    }

    Ok(out)
}

/// Flips left-right.
pub fn mirror(src: &GrayImage) -> Result<GrayImage, Error> {
    let (w, h) = (src.width(), src.height());
    let mut out = GrayImage::with_counter(w, h, src.maxval(), src.counter())?;

    for y in 0..h {
        for x in 0..w {
            out.set(w - 1 - x, y, src.get(x, y));
        }
    }

    Ok(out)
}

/// Copies the `w x h` rectangle at `(x, y)` into a new image.
///
/// # Panics
/// If the rectangle does not fit inside `src`.
pub fn crop(src: &GrayImage, x: usize, y: usize, w: usize, h: usize) -> Result<GrayImage, Error> {
    assert!(
        src.valid_rect(x, y, w, h),
        "crop rectangle ({x}, {y}, {w}, {h}) outside {}x{} image",
        src.width(),
        src.height()
    );
    let mut out = GrayImage::with_counter(w, h, src.maxval(), src.counter())?;

    for oy in 0..h {
        for ox in 0..w {
            out.set(ox, oy, src.get(x + ox, y + oy));
        }
    }

    Ok(out)
}
