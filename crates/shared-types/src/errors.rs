//! # Error Types
//!
//! Errors raised while parsing chain primitives from bytes or hex text.

use thiserror::Error;

/// Errors that can occur when building a primitive from external input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Input was not valid hexadecimal.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Hex text was missing the mandatory `0x` prefix.
    #[error("hex string without 0x prefix")]
    MissingPrefix,

    /// Byte length did not match the fixed width of the target type.
    #[error("invalid length for {kind}: expected {expected} bytes, got {got}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
}
