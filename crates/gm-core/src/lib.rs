//! Core of the `graymap` workspace: an owned 8-bit grayscale raster and the
//! primitives every other crate builds on.
//!
//! ## Layout
//! Pixels are row-major with the origin at the top-left corner; pixel
//! `(x, y)` is sample `y * width + x`. This is also the sample order of the
//! raw PGM files read and written by [`GrayImage::load`] and
//! [`GrayImage::save`].
//!
//! ## Contracts
//! Coordinates and rectangles passed to accessors must lie inside the image;
//! violations panic. Allocation and I/O failures are returned as [`Error`].
//!
//! ## Instrumentation
//! Each image reports pixel accesses to an [`AccessCounter`]. Single pixel
//! reads and writes count one access each.

mod border;
mod counter;
mod error;
mod image;
mod pgm;
mod point;

pub use border::clamp_index;
pub use counter::{AccessCounter, CounterSnapshot};
pub use error::{Error, ErrorKind};
pub use image::{GrayImage, PixelStats};
