//! # FW-02 Account Derivation - Deterministic Sub-Accounts
//!
//! **Component ID:** 2
//! **Depends on:** `fw-01-binding-codec` for the footer.
//!
//! ## Purpose
//!
//! Computes the address of the sub-account owned by an entity
//! `(chain_id, owner_contract, owner_id)` under a given account implementation,
//! and checks whether that account exists with the binding it should carry.
//!
//! ```text
//! address = keccak256(0xff ++ registry ++ salt ++ keccak256(init_code))[12..]
//! init_code = proxy preamble(implementation) ++ footer(salt, chain_id, owner_contract, owner_id)
//! ```
//!
//! ## Identity Rules
//!
//! - The implementation address is an input to derivation. Changing it
//!   changes every derived address; there is no in-place upgrade.
//! - The implementation in use is an explicit [`ImplementationRecord`]
//!   (label, version, layout), never a bare address constant.
//!
//! ## Inspection Outcomes
//!
//! | Status | Meaning | Recovery |
//! |--------|---------|----------|
//! | `Materialized` | expected proxy and a conforming layout | none |
//! | `NotMaterialized` | no code at the derived address | create the account |
//! | `StaleBinding` | wrong code, or a layout that misreads the footer | migrate to a new address |
//!
//! [`ImplementationRecord`]: domain::ImplementationRecord

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::InMemoryChain;
    pub use crate::domain::{
        compute_create2_address, creation_code, implementation_from_runtime, plan_migration,
        runtime_code, AccountStatus, AddressDeriver, ImplementationRecord, MigrationEntry,
        StaleBinding, StaleReason, SubAccount, SubAccountKey,
    };
    pub use crate::errors::{ChainError, DerivationError};
    pub use crate::ports::CodeReader;
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID.
pub const COMPONENT_ID: u8 = 2;
