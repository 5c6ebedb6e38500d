//! In-place gray-level remapping. These never fail and never change geometry.

use crate::GrayImage;

impl GrayImage {
    /// Photographic negative: `s -> maxval - s`.
    pub fn negate(&mut self) {
        let maxval = self.maxval();
        self.remap(1, |s| maxval.saturating_sub(s));
    }

    /// Levels below `thr` become 0, the rest become `maxval`.
    pub fn threshold(&mut self, thr: u8) {
        let maxval = self.maxval();
        self.remap(1, |s| if s < thr { 0 } else { maxval });
    }

    /// Scales every level by `factor`, rounding half-up and saturating at
    /// `maxval`.
    ///
    /// # Panics
    /// If `factor` is negative or NaN.
    pub fn brighten(&mut self, factor: f64) {
        assert!(factor >= 0.0, "brighten factor must be non-negative");
        let maxval = self.maxval();
        self.remap(2, |s| {
            let v = f64::from(s) * factor;
            if v > f64::from(maxval) {
                maxval
            } else {
                (v + 0.5) as u8
            }
        });
    }

    fn remap(&mut self, cost_per_pixel: u64, f: impl Fn(u8) -> u8) {
        let n = self.len() as u64;
        for px in self.pixels_mut() {
            *px = f(*px);
        }
        self.counter().add(n * cost_per_pixel);
    }
}

#[cfg(test)]
mod tests {
    use crate::{AccessCounter, GrayImage};

    #[test]
    fn negate_twice_is_identity() {
        let orig = GrayImage::from_vec(3, 1, 100, vec![0, 40, 100]).expect("valid image");
        let mut img = orig.clone();

        img.negate();
        assert_eq!(img.row(0), &[100, 60, 0]);
        img.negate();
        assert_eq!(img, orig);
    }

    #[test]
    fn threshold_splits_at_level() {
        let mut img = GrayImage::from_vec(4, 1, 200, vec![0, 99, 100, 180]).expect("valid image");
        img.threshold(100);
        assert_eq!(img.row(0), &[0, 0, 200, 200]);
    }

    #[test]
    fn brighten_rounds_half_up_and_saturates() {
        let mut img = GrayImage::from_vec(4, 1, 200, vec![1, 3, 100, 150]).expect("valid image");
        img.brighten(1.5);
        // 1.5 -> 2, 4.5 -> 5, 150 -> 150, 225 -> 200
        assert_eq!(img.row(0), &[2, 5, 150, 200]);

        img.brighten(0.0);
        assert_eq!(img.stats().max, 0);
    }

    #[test]
    fn pointwise_costs_are_counted() {
        let counter = AccessCounter::new();
        let mut img = GrayImage::with_counter(2, 3, 255, &counter).expect("valid image");

        img.negate();
        assert_eq!(counter.pixmem(), 6);
        img.brighten(1.0);
        assert_eq!(counter.pixmem(), 18);
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn negative_factor_panics() {
        let mut img = GrayImage::new(1, 1, 255).expect("valid image");
        img.brighten(-0.5);
    }
}
