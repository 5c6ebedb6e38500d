//! Exact subimage search.
//!
//! Matching compares whole rows and stops at the first row that differs.
//! Each compared row counts `needle.width()` accesses on both images.

use gm_core::GrayImage;

/// True if `needle` is byte-identical to the region of `haystack` whose
/// top-left corner is `(x, y)`.
///
/// # Panics
/// If `(x, y)` is not a pixel of `haystack` or `needle` does not fit there.
pub fn match_at(haystack: &GrayImage, x: usize, y: usize, needle: &GrayImage) -> bool {
    assert!(
        haystack.valid_pos(x, y),
        "match position ({x}, {y}) outside {}x{} image",
        haystack.width(),
        haystack.height()
    );
    assert!(
        haystack.valid_rect(x, y, needle.width(), needle.height()),
        "{}x{} needle does not fit at ({x}, {y})",
        needle.width(),
        needle.height()
    );

    let w = needle.width();
    (0..needle.height()).all(|ny| haystack.row_span(x, y + ny, w) == needle.row(ny))
}

/// Finds the first placement of `needle` inside `haystack`.
///
/// Candidates are scanned column by column: x ascending in the outer loop,
/// y ascending in the inner one, over every offset where the needle fits.
pub fn locate(haystack: &GrayImage, needle: &GrayImage) -> Option<(usize, usize)> {
    let (hw, hh) = (haystack.width(), haystack.height());
    if hw == 0 || hh == 0 {
        return None;
    }

    // An empty needle fits anywhere the offset itself is a pixel.
    let max_x = hw.checked_sub(needle.width())?.min(hw - 1);
    let max_y = hh.checked_sub(needle.height())?.min(hh - 1);

    (0..=max_x)
        .flat_map(|x| (0..=max_y).map(move |y| (x, y)))
        .find(|&(x, y)| match_at(haystack, x, y, needle))
}
