use crate::{AccessCounter, Error};

/// Owned 8-bit grayscale raster.
///
/// Pixels are stored row-major with no padding: pixel `(x, y)` lives at linear
/// index `y * width + x`. Every sample is expected to stay within
/// `[0, maxval]`; writes are not checked against `maxval`.
#[derive(Debug, Clone)]
pub struct GrayImage {
    width: usize,
    height: usize,
    maxval: u8,
    pixels: Vec<u8>,
    counter: AccessCounter,
}

/// Minimum and maximum gray level of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelStats {
    pub min: u8,
    pub max: u8,
}

impl GrayImage {
    /// Creates a black image tied to a fresh counter.
    pub fn new(width: usize, height: usize, maxval: u8) -> Result<Self, Error> {
        Self::with_counter(width, height, maxval, &AccessCounter::new())
    }

    /// Creates a black image that reports accesses to `counter`.
    ///
    /// # Panics
    /// If `maxval == 0`.
    pub fn with_counter(
        width: usize,
        height: usize,
        maxval: u8,
        counter: &AccessCounter,
    ) -> Result<Self, Error> {
        assert!(maxval > 0, "maxval must be in 1..=255");
        let pixels = alloc_zeroed(width, height)?;

        Ok(Self {
            width,
            height,
            maxval,
            pixels,
            counter: counter.clone(),
        })
    }

    pub fn from_vec(width: usize, height: usize, maxval: u8, data: Vec<u8>) -> Result<Self, Error> {
        assert!(maxval > 0, "maxval must be in 1..=255");
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            maxval,
            pixels: data,
            counter: AccessCounter::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn maxval(&self) -> u8 {
        self.maxval
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn counter(&self) -> &AccessCounter {
        &self.counter
    }

    pub fn valid_pos(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// True if the `w x h` rectangle with top-left corner `(x, y)` lies inside
    /// the image.
    pub fn valid_rect(&self, x: usize, y: usize, w: usize, h: usize) -> bool {
        x.checked_add(w).is_some_and(|right| right <= self.width)
            && y.checked_add(h).is_some_and(|bottom| bottom <= self.height)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        let idx = y * self.width + x;
        debug_assert!(idx < self.pixels.len());
        idx
    }

    /// Reads the gray level at `(x, y)`.
    ///
    /// # Panics
    /// If `(x, y)` is outside the image.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        assert!(
            self.valid_pos(x, y),
            "pixel ({x}, {y}) outside {}x{} image",
            self.width,
            self.height
        );
        self.counter.add(1);
        self.pixels[self.index(x, y)]
    }

    /// Writes the gray level at `(x, y)`.
    ///
    /// # Panics
    /// If `(x, y)` is outside the image.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, level: u8) {
        assert!(
            self.valid_pos(x, y),
            "pixel ({x}, {y}) outside {}x{} image",
            self.width,
            self.height
        );
        self.counter.add(1);
        let idx = self.index(x, y);
        self.pixels[idx] = level;
    }

    /// Borrows row `y`; counts one access per pixel in the row.
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.height, "row index out of bounds");
        self.counter.add(self.width as u64);
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Borrows the `len` pixels of row `y` starting at column `x`; counts
    /// `len` accesses.
    ///
    /// # Panics
    /// If the span does not lie inside the image.
    pub fn row_span(&self, x: usize, y: usize, len: usize) -> &[u8] {
        assert!(
            self.valid_rect(x, y, len, 1),
            "row span ({x}, {y}) +{len} outside {}x{} image",
            self.width,
            self.height
        );
        self.counter.add(len as u64);
        let start = y * self.width + x;
        &self.pixels[start..start + len]
    }

    pub fn stats(&self) -> PixelStats {
        self.counter.add(self.pixels.len() as u64);
        let mut it = self.pixels.iter().copied();
        let Some(first) = it.next() else {
            return PixelStats { min: 0, max: 0 };
        };

        it.fold(
            PixelStats {
                min: first,
                max: first,
            },
            |acc, v| PixelStats {
                min: acc.min.min(v),
                max: acc.max.max(v),
            },
        )
    }

    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        maxval: u8,
        pixels: Vec<u8>,
        counter: &AccessCounter,
    ) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            maxval,
            pixels,
            counter: counter.clone(),
        }
    }

    pub(crate) fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

impl PartialEq for GrayImage {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.maxval == other.maxval
            && self.pixels == other.pixels
    }
}

impl Eq for GrayImage {}

/// Empty buffer with room for exactly `width * height` samples.
pub(crate) fn alloc_reserved(width: usize, height: usize) -> Result<Vec<u8>, Error> {
    let len = width
        .checked_mul(height)
        .ok_or(Error::Allocation { width, height })?;
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|_| Error::Allocation { width, height })?;
    Ok(pixels)
}

fn alloc_zeroed(width: usize, height: usize) -> Result<Vec<u8>, Error> {
    let mut pixels = alloc_reserved(width, height)?;
    pixels.resize(width * height, 0);
    Ok(pixels)
}
