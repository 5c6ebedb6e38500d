//! Umbrella crate for the `graymap` workspace.
//!
//! Re-exports the image store and every operation crate so callers only
//! depend on one crate.

pub use gm_composite::*;
pub use gm_core::*;
pub use gm_filter::*;
pub use gm_geom::*;
pub use gm_search::*;
