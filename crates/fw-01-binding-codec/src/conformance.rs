//! # Layout Conformance
//!
//! Checks that a reader layout decodes what the encoder wrote. The probe
//! footer has pairwise-distinct field words, so any shift or truncation
//! shows up as a per-field mismatch instead of silently agreeing.

use crate::codec::{decode_footer, encode_footer};
use crate::domain::{BindingFooter, FooterField, FooterLayout};
use crate::errors::ConformanceError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, U256};

/// One field a layout reads differently from the encoder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMismatch {
    /// Field as the layout names it.
    pub field: FooterField,
    /// Word the encoder wrote for this field.
    pub expected: Hash,
    /// Word the layout read.
    pub found: Hash,
}

/// Footer whose four words are pairwise distinct and non-zero.
#[must_use]
pub fn probe_footer() -> BindingFooter {
    BindingFooter::new(
        U256::from(0x5a17u64),
        U256::from(0xc4a1u64),
        Address::new([0x0c; 20]),
        U256::from(0x1du64),
    )
}

/// Verify `layout` against a footer written at `layout.offset()`.
///
/// Catches readers that name fields by the wrong word count.
pub fn verify_layout(layout: &FooterLayout) -> Result<(), ConformanceError> {
    verify_layout_at(layout, layout.offset())
}

/// Verify `layout` against a footer the encoder placed at `footer_offset`.
///
/// Use this when the footer position is fixed by the surrounding bytes (for
/// example a proxy preamble), so a wrong reader offset is caught too.
pub fn verify_layout_at(layout: &FooterLayout, footer_offset: usize) -> Result<(), ConformanceError> {
    let probe = probe_footer();
    let mut bytes = vec![0xfe; footer_offset];
    bytes.extend_from_slice(&encode_footer(&probe));

    let decoded = decode_footer(&bytes, *layout);
    let mismatches: Vec<FieldMismatch> = layout
        .fields()
        .iter()
        .zip(decoded.words())
        .filter_map(|(field, found)| {
            let expected = probe.field_word(*field);
            (expected != *found).then(|| FieldMismatch {
                field: *field,
                expected: Hash::new(expected),
                found: Hash::new(*found),
            })
        })
        .collect();

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(ConformanceError::Mismatch {
            layout: *layout,
            mismatches,
        })
    }
}

/// Probe word for `field`, as a hash for reports.
#[must_use]
pub fn probe_word(field: FooterField) -> Hash {
    Hash::new(probe_footer().field_word(field))
}
