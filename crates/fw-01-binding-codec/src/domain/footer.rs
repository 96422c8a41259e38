//! # Binding Footer
//!
//! The four-field record appended to each sub-account, and the view a
//! layout produces when it reads one back.

use super::layout::{FooterField, FooterLayout, FOOTER_FIELD_COUNT};
use crate::abi::{address_from_word, u256_from_word, word_from_address, word_from_u256, Word};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde::Deserialize;
use shared_types::{Address, U256};

/// Binding between a sub-account and its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
pub struct BindingFooter {
    /// Derivation salt.
    pub salt: U256,
    /// Chain the owner lives on.
    pub chain_id: U256,
    /// Owner contract (entity collection).
    pub owner_contract: Address,
    /// Owner id within `owner_contract`.
    pub owner_id: U256,
}

impl BindingFooter {
    /// Create a footer.
    #[must_use]
    pub fn new(salt: U256, chain_id: U256, owner_contract: Address, owner_id: U256) -> Self {
        Self {
            salt,
            chain_id,
            owner_contract,
            owner_id,
        }
    }

    /// Encoded word of one field.
    #[must_use]
    pub fn field_word(&self, field: FooterField) -> Word {
        match field {
            FooterField::Salt => word_from_u256(self.salt),
            FooterField::ChainId => word_from_u256(self.chain_id),
            FooterField::OwnerContract => word_from_address(self.owner_contract),
            FooterField::OwnerId => word_from_u256(self.owner_id),
        }
    }

    /// All four words in encoder order.
    #[must_use]
    pub fn words(&self) -> [Word; FOOTER_FIELD_COUNT] {
        FooterField::CANONICAL_ORDER.map(|field| self.field_word(field))
    }
}

/// Words read under a layout, named by the fields that layout claims.
///
/// Fields the layout does not cover read as `None`. A wrong layout still
/// produces values; they are just the wrong ones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFooter {
    layout: FooterLayout,
    words: Vec<Word>,
}

impl DecodedFooter {
    pub(crate) fn new(layout: FooterLayout, words: Vec<Word>) -> Self {
        debug_assert_eq!(words.len(), layout.field_count());
        Self { layout, words }
    }

    /// Layout the words were read with.
    #[must_use]
    pub fn layout(&self) -> FooterLayout {
        self.layout
    }

    /// Raw words in read order.
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Word the layout names as `field`.
    #[must_use]
    pub fn word(&self, field: FooterField) -> Option<&Word> {
        self.layout
            .fields()
            .iter()
            .position(|f| *f == field)
            .and_then(|idx| self.words.get(idx))
    }

    /// Decoded salt.
    #[must_use]
    pub fn salt(&self) -> Option<U256> {
        self.word(FooterField::Salt).map(u256_from_word)
    }

    /// Decoded chain id.
    #[must_use]
    pub fn chain_id(&self) -> Option<U256> {
        self.word(FooterField::ChainId).map(u256_from_word)
    }

    /// Decoded owner contract.
    #[must_use]
    pub fn owner_contract(&self) -> Option<Address> {
        self.word(FooterField::OwnerContract).map(address_from_word)
    }

    /// Decoded owner id.
    #[must_use]
    pub fn owner_id(&self) -> Option<U256> {
        self.word(FooterField::OwnerId).map(u256_from_word)
    }

    /// Full footer, if the layout covers all four fields.
    #[must_use]
    pub fn to_footer(&self) -> Option<BindingFooter> {
        Some(BindingFooter {
            salt: self.salt()?,
            chain_id: self.chain_id()?,
            owner_contract: self.owner_contract()?,
            owner_id: self.owner_id()?,
        })
    }

    /// True if every field this layout names decodes to the expected word.
    #[must_use]
    pub fn matches(&self, expected: &BindingFooter) -> bool {
        self.layout
            .fields()
            .iter()
            .zip(&self.words)
            .all(|(field, word)| expected.field_word(*field) == *word)
    }

    /// True if all four fields were read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.layout.is_complete()
    }
}

impl Serialize for DecodedFooter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DecodedFooter", 5)?;
        state.serialize_field("layout", &self.layout)?;
        state.serialize_field("salt", &self.salt())?;
        state.serialize_field("chain_id", &self.chain_id())?;
        state.serialize_field("owner_contract", &self.owner_contract())?;
        state.serialize_field("owner_id", &self.owner_id())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BindingFooter {
        BindingFooter::new(
            U256::zero(),
            U256::from(8453u64),
            Address::new([0x11; 20]),
            U256::from(42u64),
        )
    }

    #[test]
    fn test_words_in_encoder_order() {
        let footer = sample();
        let words = footer.words();
        assert_eq!(u256_from_word(&words[0]), U256::zero());
        assert_eq!(u256_from_word(&words[1]), U256::from(8453u64));
        assert_eq!(address_from_word(&words[2]), Address::new([0x11; 20]));
        assert_eq!(u256_from_word(&words[3]), U256::from(42u64));
    }

    #[test]
    fn test_partial_layout_leaves_leading_fields_empty() {
        let footer = sample();
        let words = footer.words();
        let decoded = DecodedFooter::new(FooterLayout::LEGACY_RUNTIME, words[1..].to_vec());
        assert_eq!(decoded.salt(), None);
        assert_eq!(decoded.owner_id(), Some(U256::from(42u64)));
        assert!(decoded.to_footer().is_none());
        assert!(!decoded.is_complete());
        assert!(decoded.matches(&footer));
    }

    #[test]
    fn test_serializes_named_fields() {
        let footer = sample();
        let decoded = DecodedFooter::new(FooterLayout::ENCODED, footer.words().to_vec());
        let json = serde_json::to_value(&decoded).unwrap();
        assert_eq!(json["layout"]["field_count"], 4);
        assert!(json["owner_contract"].is_string());
    }
}
