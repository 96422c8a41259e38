//! # Error Types
//!
//! Errors shared across crates.

use thiserror::Error;

/// Errors from parsing the text form of a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length does not match the target type.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Errors from an address registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No address recorded under this name.
    #[error("no address registered for module '{0}'")]
    UnknownName(String),

    /// The backing store could not be read or written.
    #[error("address registry storage error: {0}")]
    Storage(String),
}
