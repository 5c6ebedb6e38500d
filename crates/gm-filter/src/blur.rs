use gm_core::{Error, GrayImage};

use crate::IntegralImage;

/// Replaces every pixel with the rounded mean of the `(2dx+1) x (2dy+1)`
/// window centred on it, replicating edge pixels past the border.
///
/// On error the image is left untouched; the only failure is the allocation
/// of the integral table.
pub fn blur(img: &mut GrayImage, dx: usize, dy: usize) -> Result<(), Error> {
    if img.is_empty() {
        return Ok(());
    }

    let table = IntegralImage::clamped(img, dx, dy)?;
    let area = ((2 * dx + 1) * (2 * dy + 1)) as u64;
    let half = area / 2;

    for y in 0..img.height() {
        for x in 0..img.width() {
            // Table column x + dx maps to source column x, so the window
            // spans table columns [x, x + 2dx].
            let sum = table.rect_sum(x, y, x + 2 * dx, y + 2 * dy);
            img.set(x, y, ((sum + half) / area) as u8);
        }
    }

    Ok(())
}
