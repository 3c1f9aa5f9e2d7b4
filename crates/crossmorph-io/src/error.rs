//! I/O error types
//!
//! Provides a unified error type for raw buffer I/O and file name handling.

use thiserror::Error;

/// Error type for raw buffer I/O.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents do not match the expected buffer size
    #[error("invalid image data: {0}")]
    InvalidData(String),

    /// The file name does not encode usable dimensions
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// An error from the core library (e.g. misaligned dimensions)
    #[error("core error: {0}")]
    Core(#[from] crossmorph_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
