//! Error types for the test framework

use thiserror::Error;

/// Errors that can occur during regression testing
#[derive(Debug, Error)]
pub enum TestError {
    /// Failed to build a fixture buffer
    #[error("failed to build fixture: {0}")]
    Fixture(#[from] crossmorph_core::Error),

    /// Failed to write a result buffer
    #[error("failed to write buffer '{path}': {message}")]
    BufferWrite { path: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
