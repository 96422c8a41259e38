//! # Domain Entities
//!
//! Implementation records, derivation keys, and what inspection finds at a
//! derived address.

use fw_01_binding_codec::domain::{BindingFooter, DecodedFooter, FooterLayout};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Bytes, U256};
use std::fmt;

// =============================================================================
// IMPLEMENTATION RECORD
// =============================================================================

/// A known account implementation and the registry that deploys it.
///
/// Derived addresses are a function of the implementation, so the record is
/// versioned: switching implementations is a migration, never a silent swap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationRecord {
    /// Human-readable name (for reports).
    pub label: String,
    /// Record version, bumped on every implementation change.
    pub version: u32,
    /// Account implementation the proxies delegate to.
    pub implementation: Address,
    /// CREATE2 deployer (account registry).
    pub registry: Address,
    /// Footer layout the implementation reads its binding with.
    pub layout: FooterLayout,
}

impl ImplementationRecord {
    /// Record reading the current runtime layout.
    #[must_use]
    pub fn new(label: impl Into<String>, version: u32, implementation: Address, registry: Address) -> Self {
        Self {
            label: label.into(),
            version,
            implementation,
            registry,
            layout: FooterLayout::RUNTIME,
        }
    }

    /// Override the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: FooterLayout) -> Self {
        self.layout = layout;
        self
    }
}

// =============================================================================
// SUB-ACCOUNT KEY
// =============================================================================

/// Everything the derived address depends on besides the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubAccountKey {
    /// Account implementation.
    pub implementation: Address,
    /// Derivation salt.
    pub salt: U256,
    /// Owner chain.
    pub chain_id: U256,
    /// Owner contract.
    pub owner_contract: Address,
    /// Owner id.
    pub owner_id: U256,
}

impl SubAccountKey {
    /// Footer this key binds into the account.
    #[must_use]
    pub fn footer(&self) -> BindingFooter {
        BindingFooter::new(self.salt, self.chain_id, self.owner_contract, self.owner_id)
    }
}

impl fmt::Display for SubAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} on chain {} via {}",
            self.owner_contract, self.owner_id, self.chain_id, self.implementation
        )
    }
}

/// A derived sub-account and the code that must live at its address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAccount {
    /// Derived address.
    pub address: Address,
    /// Inputs it was derived from.
    pub key: SubAccountKey,
    /// Bound footer.
    pub footer: BindingFooter,
    /// Expected runtime code.
    pub runtime_code: Bytes,
}

// =============================================================================
// INSPECTION RESULTS
// =============================================================================

/// Why a materialized account does not carry the expected binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    /// Code delegates to a different implementation, or is not a proxy.
    ImplementationMismatch,
    /// Proxy is right but the footer bytes differ.
    FooterMismatch,
    /// Code is right but the implementation reads the footer with a layout
    /// that does not decode what was encoded.
    NonConformingLayout,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ImplementationMismatch => "implementation mismatch",
            Self::FooterMismatch => "footer mismatch",
            Self::NonConformingLayout => "non-conforming footer layout",
        };
        f.write_str(text)
    }
}

/// Diagnostic view of an account whose binding cannot be trusted.
///
/// Recovery is a new address, not account creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StaleBinding {
    /// Inspected address.
    pub address: Address,
    /// Classification.
    pub reason: StaleReason,
    /// Implementation the key names.
    pub expected_implementation: Address,
    /// Implementation the code delegates to, if it is a proxy.
    pub found_implementation: Option<Address>,
    /// Footer read with the current runtime layout.
    pub found_footer: DecodedFooter,
    /// Footer as the shifted legacy reader would see it.
    pub legacy_view: DecodedFooter,
}

/// Result of inspecting a derived address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccountStatus {
    /// Code matches and the binding reads back correctly.
    Materialized(SubAccount),
    /// No code at the derived address.
    NotMaterialized {
        /// Derived address.
        address: Address,
    },
    /// Code exists but does not carry a trustworthy binding.
    StaleBinding(Box<StaleBinding>),
}

impl AccountStatus {
    /// True for [`AccountStatus::Materialized`].
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        matches!(self, Self::Materialized(_))
    }
}

// =============================================================================
// MIGRATION
// =============================================================================

/// One owner's move from an old implementation's address to a new one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationEntry {
    /// Owner id.
    pub owner_id: U256,
    /// Address under the old record.
    pub from_address: Address,
    /// Address under the new record.
    pub to_address: Address,
}
