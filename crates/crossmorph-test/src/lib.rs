//! crossmorph-test - Regression test framework for crossmorph
//!
//! Provides a small regression harness in the style of C regutils and a
//! set of fixture buffers shared by the test suites.
//!
//! # Usage
//!
//! ```ignore
//! use crossmorph_test::{RegParams, impulse};
//!
//! let mut rp = RegParams::new("crossmorph1");
//! let pixs = impulse(8, 8, 4, 4, 255);
//! rp.compare_values(255.0, pixs.get_pixel(4, 4).unwrap() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use crossmorph_core::PixelBuffer;

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // crossmorph-test is at crates/crossmorph-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// All-zero buffer with a single pixel set to `value` at `(row, col)`.
///
/// # Panics
///
/// Panics on invalid dimensions or an out-of-range coordinate.
pub fn impulse(width: u32, height: u32, row: u32, col: u32, value: u8) -> PixelBuffer {
    let mut pix = PixelBuffer::new(width, height).expect("impulse dimensions");
    pix.set_pixel(col, row, value).expect("impulse coordinate");
    pix
}

/// Buffer whose pixel at `(row, col)` is `(row * 31 + col * 17) % 256`.
pub fn gradient(width: u32, height: u32) -> TestResult<PixelBuffer> {
    let data = (0..height)
        .flat_map(|row| (0..width).map(move |col| ((row * 31 + col * 17) % 256) as u8))
        .collect();
    Ok(PixelBuffer::from_vec(width, height, data)?)
}

/// Buffer of uniformly random bytes.
pub fn random_buffer(width: u32, height: u32) -> TestResult<PixelBuffer> {
    let data = (0..width as usize * height as usize)
        .map(|_| rand::random::<u8>())
        .collect();
    Ok(PixelBuffer::from_vec(width, height, data)?)
}

/// A copy of `base` with random non-negative offsets added (saturating),
/// so the result is pointwise `>=` `base`.
pub fn random_upper_bound(base: &PixelBuffer) -> TestResult<PixelBuffer> {
    let data = base
        .data()
        .iter()
        .map(|&v| v.saturating_add(rand::random::<u8>() % 64))
        .collect();
    Ok(PixelBuffer::from_vec(base.width(), base.height(), data)?)
}
