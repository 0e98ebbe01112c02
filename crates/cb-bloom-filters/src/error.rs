//! Error types for the bloom filter crate

use thiserror::Error;

/// Errors raised when building or combining filters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Filter length mismatch: config expects {expected} bytes, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}
