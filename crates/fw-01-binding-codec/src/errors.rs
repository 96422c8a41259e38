//! # Error Types
//!
//! Layout construction and conformance errors. Decoding itself has none.

use crate::conformance::FieldMismatch;
use crate::domain::FooterLayout;
use thiserror::Error;

/// Errors from building a [`FooterLayout`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A footer has between one and four fields.
    #[error("field count {field_count} out of range 1..=4")]
    FieldCountOutOfRange { field_count: usize },

    /// No layout is published under this version.
    #[error("unknown footer layout version {0}")]
    UnknownVersion(u16),
}

/// A layout that does not read back what the encoder wrote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConformanceError {
    /// One or more fields decoded to a different word than was encoded.
    #[error("layout v{} (offset {:#x}, {} fields) disagrees with the encoder on {} field(s)",
        .layout.version(), .layout.offset(), .layout.field_count(), .mismatches.len())]
    Mismatch {
        layout: FooterLayout,
        mismatches: Vec<FieldMismatch>,
    },
}
