//! # Footer Codec
//!
//! `encode_footer` writes the four words in encoder order. `decode_footer`
//! reads `layout.field_count()` words from `layout.offset()` and names them by
//! the layout's fields. Neither operation fails: short input is zero-filled.

use crate::abi::{decode_words, encode_words};
use crate::domain::{BindingFooter, DecodedFooter, FooterLayout};

/// Encode a footer into its 128-byte form.
#[must_use]
pub fn encode_footer(footer: &BindingFooter) -> Vec<u8> {
    encode_words(&footer.words())
}

/// Decode the words `layout` covers from `bytes`.
#[must_use]
pub fn decode_footer(bytes: &[u8], layout: FooterLayout) -> DecodedFooter {
    DecodedFooter::new(
        layout,
        decode_words(bytes, layout.offset(), layout.field_count()),
    )
}

/// A codec pinned to one layout.
///
/// Components that read footers hold a `BindingCodec` rather than a bare
/// offset, so the layout in use is part of their configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindingCodec {
    layout: FooterLayout,
}

impl BindingCodec {
    /// Codec for `layout`.
    #[must_use]
    pub const fn new(layout: FooterLayout) -> Self {
        Self { layout }
    }

    /// Codec for deployed runtime code.
    #[must_use]
    pub const fn runtime() -> Self {
        Self::new(FooterLayout::RUNTIME)
    }

    /// Layout in use.
    #[must_use]
    pub const fn layout(&self) -> FooterLayout {
        self.layout
    }

    /// See [`encode_footer`].
    #[must_use]
    pub fn encode(&self, footer: &BindingFooter) -> Vec<u8> {
        encode_footer(footer)
    }

    /// Decode with the pinned layout.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> DecodedFooter {
        decode_footer(bytes, self.layout)
    }
}

impl Default for BindingCodec {
    fn default() -> Self {
        Self::runtime()
    }
}
