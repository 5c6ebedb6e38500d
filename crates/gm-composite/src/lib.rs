//! Writes one image into a region of another, in place.

use gm_core::GrayImage;

/// Overwrites the region of `dst` at `(x, y)` with `src`.
///
/// # Panics
/// If `src` does not fit inside `dst` at `(x, y)`.
pub fn paste(dst: &mut GrayImage, x: usize, y: usize, src: &GrayImage) {
    assert_fits(dst, x, y, src);

    for sy in 0..src.height() {
        for sx in 0..src.width() {
            dst.set(x + sx, y + sy, src.get(sx, sy));
        }
    }
}

/// Blends `src` into `dst` at `(x, y)`: `dst * (1 - alpha) + src * alpha`,
/// rounded half-up and saturated to `[0, dst.maxval()]`.
///
/// `alpha` outside `[0, 1]` extrapolates.
///
/// # Panics
/// If `src` does not fit inside `dst` at `(x, y)`.
pub fn blend(dst: &mut GrayImage, x: usize, y: usize, src: &GrayImage, alpha: f64) {
    assert_fits(dst, x, y, src);
    let maxval = f64::from(dst.maxval());

    for sy in 0..src.height() {
        for sx in 0..src.width() {
            let d = f64::from(dst.get(x + sx, y + sy));
            let s = f64::from(src.get(sx, sy));
            let v = (d * (1.0 - alpha) + s * alpha + 0.5).trunc();
            dst.set(x + sx, y + sy, v.clamp(0.0, maxval) as u8);
        }
    }
}

fn assert_fits(dst: &GrayImage, x: usize, y: usize, src: &GrayImage) {
    assert!(
        dst.valid_rect(x, y, src.width(), src.height()),
        "{}x{} image does not fit at ({x}, {y}) in {}x{} image",
        src.width(),
        src.height(),
        dst.width(),
        dst.height()
    );
}
