//! # Footer Layout
//!
//! Versioned decode parameters. The field order is fixed by the encoder; a
//! layout only chooses where reading starts and how many trailing fields of
//! that order it covers.

use crate::abi::WORD_SIZE;
use crate::errors::LayoutError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fields the encoder writes.
pub const FOOTER_FIELD_COUNT: usize = 4;

/// Encoded footer length in bytes.
pub const FOOTER_SIZE: usize = FOOTER_FIELD_COUNT * WORD_SIZE;

/// Footer position inside a deployed sub-account's runtime code
/// (length of the 45-byte delegating proxy preamble).
pub const RUNTIME_FOOTER_OFFSET: usize = 0x2d;

/// One footer field, in encoder order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterField {
    /// Derivation salt.
    Salt,
    /// Chain the owner lives on.
    ChainId,
    /// Owner contract address.
    OwnerContract,
    /// Owner id within the owner contract.
    OwnerId,
}

impl FooterField {
    /// Encoder order. Every layout names the trailing `field_count` of these.
    pub const CANONICAL_ORDER: [FooterField; FOOTER_FIELD_COUNT] = [
        FooterField::Salt,
        FooterField::ChainId,
        FooterField::OwnerContract,
        FooterField::OwnerId,
    ];

    /// Field name as used in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Salt => "salt",
            Self::ChainId => "chain_id",
            Self::OwnerContract => "owner_contract",
            Self::OwnerId => "owner_id",
        }
    }
}

impl fmt::Display for FooterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Explicit, versioned decode parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawFooterLayout", into = "RawFooterLayout")]
pub struct FooterLayout {
    version: u16,
    offset: usize,
    field_count: usize,
}

impl FooterLayout {
    /// Raw footer bytes as produced by the encoder.
    pub const ENCODED: Self = Self {
        version: 2,
        offset: 0,
        field_count: FOOTER_FIELD_COUNT,
    };

    /// Footer read from deployed runtime code.
    pub const RUNTIME: Self = Self {
        version: 2,
        offset: RUNTIME_FOOTER_OFFSET,
        field_count: FOOTER_FIELD_COUNT,
    };

    /// The first account implementation's reader: three words from the
    /// start of the footer. Names salt/chainId/ownerContract as
    /// chainId/ownerContract/ownerId.
    pub const LEGACY_RUNTIME: Self = Self {
        version: 1,
        offset: RUNTIME_FOOTER_OFFSET,
        field_count: 3,
    };

    /// Build a layout, rejecting field counts outside `1..=4`.
    pub fn new(version: u16, offset: usize, field_count: usize) -> Result<Self, LayoutError> {
        if field_count == 0 || field_count > FOOTER_FIELD_COUNT {
            return Err(LayoutError::FieldCountOutOfRange { field_count });
        }
        Ok(Self {
            version,
            offset,
            field_count,
        })
    }

    /// Published runtime layout for a version number.
    pub fn runtime_version(version: u16) -> Result<Self, LayoutError> {
        match version {
            1 => Ok(Self::LEGACY_RUNTIME),
            2 => Ok(Self::RUNTIME),
            other => Err(LayoutError::UnknownVersion(other)),
        }
    }

    /// Layout version.
    #[must_use]
    pub const fn version(&self) -> u16 {
        self.version
    }

    /// Byte offset where reading starts.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Number of words read.
    #[must_use]
    pub const fn field_count(&self) -> usize {
        self.field_count
    }

    /// Bytes covered by one read.
    #[must_use]
    pub const fn span(&self) -> usize {
        self.field_count * WORD_SIZE
    }

    /// Field names of the words this layout reads, in read order.
    #[must_use]
    pub fn fields(&self) -> &'static [FooterField] {
        &FooterField::CANONICAL_ORDER[FOOTER_FIELD_COUNT - self.field_count..]
    }

    /// True if the layout reads every encoded field.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.field_count == FOOTER_FIELD_COUNT
    }

    /// Same fields, read from another offset.
    #[must_use]
    pub const fn at_offset(self, offset: usize) -> Self {
        Self { offset, ..self }
    }
}

impl fmt::Display for FooterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} @ {:#x} x{}",
            self.version, self.offset, self.field_count
        )
    }
}

#[derive(Serialize, Deserialize)]
struct RawFooterLayout {
    version: u16,
    offset: usize,
    field_count: usize,
}

impl TryFrom<RawFooterLayout> for FooterLayout {
    type Error = LayoutError;

    fn try_from(raw: RawFooterLayout) -> Result<Self, Self::Error> {
        Self::new(raw.version, raw.offset, raw.field_count)
    }
}

impl From<FooterLayout> for RawFooterLayout {
    fn from(layout: FooterLayout) -> Self {
        Self {
            version: layout.version,
            offset: layout.offset,
            field_count: layout.field_count,
        }
    }
}
