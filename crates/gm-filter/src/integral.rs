use gm_core::{Error, GrayImage, clamp_index};

/// Summed-area table over an image virtually extended by edge replication.
///
/// Cell `(x, y)` holds the sum of every clamped sample in columns `<= x` and
/// rows `<= y` of the extended plane, whose origin sits `margin_x` columns
/// left of and `margin_y` rows above the source origin.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    /// Builds the table for `src` with `margin_x` extra columns on each side
    /// and `margin_y` extra rows above and below.
    ///
    /// Reads every cell of the extended plane through the pixel accessor.
    ///
    /// # Panics
    /// If `src` is empty.
    pub fn clamped(src: &GrayImage, margin_x: usize, margin_y: usize) -> Result<Self, Error> {
        assert!(!src.is_empty(), "cannot integrate an empty image");
        let (w, h) = (src.width(), src.height());
        let too_big = || Error::Allocation {
            width: w.saturating_add(margin_x.saturating_mul(2)),
            height: h.saturating_add(margin_y.saturating_mul(2)),
        };

        let width = margin_x
            .checked_mul(2)
            .and_then(|m| m.checked_add(w))
            .ok_or_else(too_big)?;
        let height = margin_y
            .checked_mul(2)
            .and_then(|m| m.checked_add(h))
            .ok_or_else(too_big)?;
        let len = width.checked_mul(height).ok_or_else(too_big)?;

        let mut sums = Vec::new();
        sums.try_reserve_exact(len).map_err(|_| too_big())?;
        sums.resize(len, 0u64);

        for y in 0..height {
            let sy = clamp_index(y as isize - margin_y as isize, h);
            let mut row_acc = 0u64;
            for x in 0..width {
                let sx = clamp_index(x as isize - margin_x as isize, w);
                row_acc += u64::from(src.get(sx, sy));
                let above = if y > 0 { sums[(y - 1) * width + x] } else { 0 };
                sums[y * width + x] = row_acc + above;
            }
        }

        Ok(Self {
            width,
            height,
            sums,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u64 {
        self.sums[y * self.width + x]
    }

    /// Sum over the inclusive cell range `[x0, x1] x [y0, y1]`.
    #[inline]
    pub fn rect_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        debug_assert!(x0 <= x1 && x1 < self.width);
        debug_assert!(y0 <= y1 && y1 < self.height);

        let mut sum = self.at(x1, y1);
        if x0 > 0 {
            sum -= self.at(x0 - 1, y1);
        }
        if y0 > 0 {
            sum -= self.at(x1, y0 - 1);
        }
        if x0 > 0 && y0 > 0 {
            sum += self.at(x0 - 1, y0 - 1);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use gm_core::GrayImage;

    use super::IntegralImage;

    #[test]
    fn table_without_margin_is_plain_prefix_sum() {
        let img = GrayImage::from_vec(3, 2, 255, vec![1, 2, 3, 4, 5, 6]).expect("valid image");
        let t = IntegralImage::clamped(&img, 0, 0).expect("table");

        assert_eq!((t.width(), t.height()), (3, 2));
        assert_eq!(t.at(0, 0), 1);
        assert_eq!(t.at(2, 0), 6);
        assert_eq!(t.at(0, 1), 5);
        assert_eq!(t.at(2, 1), 21);
        assert_eq!(t.rect_sum(1, 1, 2, 1), 11);
        assert_eq!(t.rect_sum(1, 0, 1, 1), 7);
    }

    #[test]
    fn margins_replicate_edges() {
        let img = GrayImage::from_vec(2, 1, 255, vec![10, 20]).expect("valid image");
        let t = IntegralImage::clamped(&img, 2, 1).expect("table");

        assert_eq!((t.width(), t.height()), (6, 3));
        // Each extended row reads 10 10 10 20 20 20.
        assert_eq!(t.rect_sum(0, 0, 5, 0), 90);
        assert_eq!(t.rect_sum(0, 0, 2, 2), 90);
        assert_eq!(t.at(5, 2), 270);
    }

    #[test]
    fn build_reads_every_extended_cell_once() {
        let img = GrayImage::new(4, 3, 255).expect("valid image");
        let _ = IntegralImage::clamped(&img, 1, 2).expect("table");
        assert_eq!(img.counter().pixmem(), 6 * 7);
    }

    #[test]
    fn absurd_margins_report_allocation_failure() {
        let img = GrayImage::new(1, 1, 255).expect("valid image");
        assert!(IntegralImage::clamped(&img, usize::MAX / 2, 0).is_err());
    }
}
