//! crossmorph - Tiled parallel grayscale morphology
//!
//! Erodes and dilates raw 8-bit grayscale buffers with a fixed cross-shaped
//! neighborhood. Each pass is split into tiles that are filtered
//! concurrently; passes alternate between two buffers instead of copying.
//!
//! # Overview
//!
//! - Pixel buffers with alignment-checked dimensions ([`PixelBuffer`])
//! - Raw file I/O and `<name>_<w>x<h>.<ext>` file naming ([`io`])
//! - Erosion/dilation engine, tile scheduling, pass plans ([`morph`])
//!
//! # Example
//!
//! ```
//! use crossmorph::PixelBuffer;
//! use crossmorph::morph::{EngineConfig, FilterEngine};
//!
//! let pix = PixelBuffer::filled(64, 64, 42).unwrap();
//! let engine = FilterEngine::new(EngineConfig::default().with_tile_size(16));
//! let out = engine.apply(pix, 2, 3).unwrap();
//! assert_eq!(out.uniform_value(), Some(42));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use crossmorph_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use crossmorph_io as io;
pub use crossmorph_morph as morph;
