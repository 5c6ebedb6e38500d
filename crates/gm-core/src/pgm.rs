//! Raw (binary) PGM codec, 8-bit only.
//!
//! Layout: `P5`, then width, height and maxval as decimal tokens separated by
//! whitespace and `#` comment lines, then exactly one whitespace byte, then
//! `width * height` samples in row-major order.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::image::alloc_reserved;
use crate::{AccessCounter, Error, GrayImage};

impl GrayImage {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::load_with_counter(path, &AccessCounter::new())
    }

    pub fn load_with_counter(
        path: impl AsRef<Path>,
        counter: &AccessCounter,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let img = Self::read_from(file, counter)?;
        debug!(
            "loaded {} ({}x{}, maxval {})",
            path.display(),
            img.width(),
            img.height(),
            img.maxval()
        );
        Ok(img)
    }

    /// Decodes a raw PGM stream.
    pub fn read_from<R: Read>(reader: R, counter: &AccessCounter) -> Result<Self, Error> {
        let mut r = HeaderReader {
            inner: BufReader::new(reader),
        };

        r.magic()?;
        let width = r.number()?.ok_or(Error::InvalidWidth)?;
        let height = r.number()?.ok_or(Error::InvalidHeight)?;
        let maxval = r
            .number()?
            .and_then(|v| u8::try_from(v).ok())
            .filter(|&v| v > 0)
            .ok_or(Error::InvalidMaxval)?;

        match r.next_byte()? {
            Some(b) if b.is_ascii_whitespace() => {}
            _ => return Err(Error::WhitespaceExpected),
        }

        let mut pixels = alloc_reserved(width, height)?;
        let len = width * height;

        // No pre-fill: only samples present in the stream touch the buffer.
        (&mut r.inner)
            .take(len as u64)
            .read_to_end(&mut pixels)
            .map_err(Error::Read)?;
        if pixels.len() < len {
            return Err(Error::ReadPixels {
                expected: len,
                actual: pixels.len(),
            });
        }

        counter.add(len as u64);
        Ok(Self::from_parts(width, height, maxval, pixels, counter))
    }

    /// Writes the image to `path`. A failed save may leave a partial file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| {
            self.counter().add(self.len() as u64);
            Error::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.write_to(BufWriter::new(file))?;
        debug!("saved {} ({}x{})", path.display(), self.width(), self.height());
        Ok(())
    }

    /// Encodes the image as raw PGM. Counts one access per pixel even on
    /// failure.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        self.counter().add(self.len() as u64);
        write!(
            writer,
            "P5\n{} {}\n{}\n",
            self.width(),
            self.height(),
            self.maxval()
        )
        .map_err(Error::WriteHeader)?;
        writer.write_all(self.pixels()).map_err(Error::WritePixels)?;
        writer.flush().map_err(Error::WritePixels)
    }
}

struct HeaderReader<R> {
    inner: BufReader<R>,
}

impl<R: Read> HeaderReader<R> {
    fn peek(&mut self) -> Result<Option<u8>, Error> {
        let buf = self.inner.fill_buf().map_err(Error::Read)?;
        Ok(buf.first().copied())
    }

    fn next_byte(&mut self) -> Result<Option<u8>, Error> {
        let b = self.peek()?;
        if b.is_some() {
            self.inner.consume(1);
        }
        Ok(b)
    }

    fn magic(&mut self) -> Result<(), Error> {
        let p = self.next_byte()?;
        let five = self.next_byte()?;
        if (p, five) != (Some(b'P'), Some(b'5')) {
            return Err(Error::InvalidFormat);
        }
        Ok(())
    }

    fn skip_blanks(&mut self) -> Result<(), Error> {
        loop {
            match self.peek()? {
                Some(b) if b.is_ascii_whitespace() => self.inner.consume(1),
                Some(b'#') => {
                    let mut line = Vec::new();
                    self.inner
                        .read_until(b'\n', &mut line)
                        .map_err(Error::Read)?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Parses a decimal token. `None` if there is no digit or it overflows.
    fn number(&mut self) -> Result<Option<usize>, Error> {
        self.skip_blanks()?;
        let mut value: Option<usize> = None;
        while let Some(b) = self.peek()?
            && b.is_ascii_digit()
        {
            self.inner.consume(1);
            let digit = usize::from(b - b'0');
            value = match value {
                None => Some(digit),
                Some(v) => match v.checked_mul(10).and_then(|v| v.checked_add(digit)) {
                    Some(v) => Some(v),
                    None => return Ok(None),
                },
            };
        }
        Ok(value)
    }
}
