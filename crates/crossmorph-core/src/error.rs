//! Error types for crossmorph-core
//!
//! Provides a unified error type for buffer construction and pixel access.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// crossmorph-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Dimensions are zero, overflow, or violate the 64-pixel alignment rule
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Backing storage could not be reserved
    #[error("memory allocation failed ({bytes} bytes)")]
    AllocationFailed { bytes: usize },

    /// Supplied pixel data does not match the declared dimensions
    #[error("buffer length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Two buffers that must share a shape do not
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Coordinate outside the buffer
    #[error("coordinate ({x}, {y}) out of bounds for {width}x{height}")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
