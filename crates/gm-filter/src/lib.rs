//! Mean filtering for 8-bit grayscale images.
//!
//! Border policy: edge replication. A window that reaches past the image
//! samples the nearest edge pixel instead, so every window holds exactly
//! `(2dx + 1) * (2dy + 1)` samples and one divisor serves the whole image.
//!
//! Window sums come from an [`IntegralImage`] built over the clamped plane,
//! which makes the cost independent of the window size.

mod blur;
mod integral;

pub use blur::blur;
pub use integral::IntegralImage;
