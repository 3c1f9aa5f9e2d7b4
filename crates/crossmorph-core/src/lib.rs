//! crossmorph-core - Basic data structures for the crossmorph filter engine
//!
//! - [`PixelBuffer`] - Row-major 8-bit grayscale image
//! - [`Dimensions`] - Width/height pair validated against [`ALIGNMENT`]
//! - [`Error`] / [`Result`] - Error type shared by the buffer API

pub mod buffer;
pub mod error;

pub use buffer::{ALIGNMENT, Dimensions, PixelBuffer, alloc_pixels};
pub use error::{Error, Result};
