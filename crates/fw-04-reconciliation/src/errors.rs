//! # Error Types
//!
//! Oracle, mutation, resolution, policy and configuration errors. None of
//! them aborts a run: they become skipped entities or failed items in the
//! report.

use crate::domain::{EntityId, ResourceId};
use shared_types::Address;
use thiserror::Error;

/// A ledger or balance read failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Source unreachable.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// Source answered with something that does not decode.
    #[error("invalid oracle response: {0}")]
    InvalidResponse(String),
}

/// A balance mutation was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// Target refused it.
    #[error("mutation rejected: {0}")]
    Rejected(String),

    /// Target unreachable.
    #[error("mutation target unavailable: {0}")]
    Unavailable(String),

    /// No answer within the submission timeout.
    #[error("submission timed out after {after_ms} ms")]
    TimedOut {
        /// Timeout that elapsed.
        after_ms: u64,
    },
}

/// An entity's sub-account could not be resolved.
///
/// Stale binding and not-materialized are distinct: the first needs a new
/// address, the second needs account creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Account exists but its binding is wrong.
    #[error("entity {entity}: stale binding at {address} ({reason})")]
    StaleBinding {
        /// Entity.
        entity: EntityId,
        /// Derived address.
        address: Address,
        /// Classification from inspection.
        reason: String,
    },

    /// No account at the derived address.
    #[error("entity {entity}: sub-account {address} not materialized")]
    NotMaterialized {
        /// Entity.
        entity: EntityId,
        /// Derived address.
        address: Address,
    },

    /// Resolution backend failed.
    #[error("entity {entity}: resolver unavailable ({reason})")]
    Unavailable {
        /// Entity.
        entity: EntityId,
        /// Backend message.
        reason: String,
    },
}

/// Invalid reconciliation policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// No rules.
    #[error("policy has no resource rules")]
    Empty,

    /// A zero rate would make every balance owed zero.
    #[error("{resource} has a zero conversion rate")]
    ZeroConversionRate {
        /// Offending resource.
        resource: ResourceId,
    },

    /// Two rules for one resource.
    #[error("{resource} has more than one rule")]
    DuplicateResource {
        /// Offending resource.
        resource: ResourceId,
    },
}

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineConfigError {
    /// A field that must be at least one is zero.
    #[error("{field} must be at least 1")]
    Zero {
        /// Field name.
        field: &'static str,
    },

    /// Backoff bounds are inverted.
    #[error("initial_backoff_ms ({initial}) exceeds max_backoff_ms ({max})")]
    BackoffRange {
        /// Initial backoff.
        initial: u64,
        /// Cap.
        max: u64,
    },
}
