//! # FW-01 Binding Codec - Sub-Account Footer Layout
//!
//! **Component ID:** 1
//! **Depends on:** `shared-types` only. Pure, stateless, no I/O.
//!
//! ## Purpose
//!
//! Byte-exact encode/decode of the binding footer that is appended to every
//! deployed sub-account:
//!
//! ```text
//! offset  0x00            0x20             0x40                  0x60            0x80
//!         ├── salt ───────┼── chainId ─────┼── ownerContract ────┼── ownerId ────┤
//!         32-byte big-endian words, addresses left-padded with zeros
//! ```
//!
//! ## Layout Contract
//!
//! Decoding is always parameterized by an explicit, versioned [`FooterLayout`]
//! (`offset`, `field_count`). A reader that uses the wrong `field_count` does
//! not fail: it silently reads shifted words. Keeping the layout a named value
//! makes such a mismatch a visible configuration diff instead of a magic
//! number duplicated in two places.
//!
//! | Layout | Version | Offset | Fields | Reads |
//! |--------|---------|--------|--------|-------|
//! | `FooterLayout::ENCODED` | 2 | `0x00` | 4 | raw footer bytes |
//! | `FooterLayout::RUNTIME` | 2 | `0x2d` | 4 | deployed runtime code |
//! | `FooterLayout::LEGACY_RUNTIME` | 1 | `0x2d` | 3 | shifted legacy reader (diagnostics only) |
//!
//! ## Errors
//!
//! The codec never errors on byte input. Wrong layouts are caught by
//! [`conformance::verify_layout`], not at decode time.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod abi;
pub mod codec;
pub mod conformance;
pub mod domain;
pub mod errors;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::abi::{
        address_from_word, decode_words, encode_call, encode_words, read_word, u256_from_word,
        word_from_address, word_from_u256, Word, WORD_SIZE,
    };
    pub use crate::codec::{decode_footer, encode_footer, BindingCodec};
    pub use crate::conformance::{probe_footer, probe_word, verify_layout, verify_layout_at, FieldMismatch};
    pub use crate::domain::{
        BindingFooter, DecodedFooter, FooterField, FooterLayout, FOOTER_FIELD_COUNT, FOOTER_SIZE,
        RUNTIME_FOOTER_OFFSET,
    };
    pub use crate::errors::{ConformanceError, LayoutError};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID.
pub const COMPONENT_ID: u8 = 1;
