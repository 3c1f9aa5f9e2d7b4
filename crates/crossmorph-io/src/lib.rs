//! crossmorph-io - Raw buffer I/O
//!
//! Images are stored headerless: exactly `width * height` 8-bit grayscale
//! bytes in row-major order. Dimensions travel in the file name as
//! `<name>_<width>x<height>.<ext>` (for example `pentagram_64x64.raw`).

mod error;
pub mod naming;
pub mod raw;

pub use error::{IoError, IoResult};
pub use naming::{OUTPUT_PREFIX, output_path, parse_dimensions};
pub use raw::{read_raw, read_raw_from, write_raw, write_raw_to};
