//! Error types for crossmorph-morph

use thiserror::Error;

/// Errors that can occur while filtering.
///
/// Every variant is fatal to a run: a partially filtered buffer is never
/// returned.
#[derive(Debug, Error)]
pub enum MorphError {
    /// Pixel count is zero or not a multiple of the tiling alignment
    #[error("invalid dimensions: {width}x{height} (pixel count must be a non-zero multiple of 64)")]
    InvalidDimensions { width: u32, height: u32 },

    /// Image or scratch buffer could not be allocated
    #[error("allocation failure: could not reserve {bytes} bytes")]
    AllocationFailure { bytes: usize },

    /// A tile task could not be started or did not complete
    #[error("worker dispatch failure: {0}")]
    WorkerDispatchFailure(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Invalid pass sequence string
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    /// Other core library error
    #[error("core error: {0}")]
    Core(crossmorph_core::Error),
}

impl From<crossmorph_core::Error> for MorphError {
    fn from(err: crossmorph_core::Error) -> Self {
        match err {
            crossmorph_core::Error::InvalidDimensions { width, height } => {
                MorphError::InvalidDimensions { width, height }
            }
            crossmorph_core::Error::AllocationFailed { bytes } => {
                MorphError::AllocationFailure { bytes }
            }
            other => MorphError::Core(other),
        }
    }
}

/// Result type for morphological operations
pub type MorphResult<T> = Result<T, MorphError>;
