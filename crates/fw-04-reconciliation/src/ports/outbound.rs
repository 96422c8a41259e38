//! # Driven Ports (SPI - Outbound)
//!
//! The engine reads the ledger, reads and increases balances, and resolves
//! entities to accounts. Everything else is an adapter.

use crate::domain::{DeltaOp, EntityId, ResourceId, TrackId};
use crate::errors::{MutationError, OracleError, ResolveError};
use async_trait::async_trait;
use shared_types::{Address, U256};

/// Authoritative, append-only experience ledger.
#[async_trait]
pub trait LedgerOracle: Send + Sync {
    /// Total experience `entity` has accumulated on `track`.
    async fn cumulative_experience(&self, entity: EntityId, track: TrackId) -> Result<U256, OracleError>;
}

/// Derived balances: readable, and increasable by the engine.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// Current balance of `resource` held by `account`.
    async fn get_balance(&self, account: Address, resource: ResourceId) -> Result<U256, OracleError>;

    /// Add `amount` of `resource` to `account`.
    async fn apply_delta(&self, account: Address, resource: ResourceId, amount: U256) -> Result<(), MutationError>;

    /// Apply several deltas in one submission.
    ///
    /// The default applies them one by one and stops at the first failure,
    /// so a failed call may have applied a prefix. The engine re-reads
    /// balances before any retry, which makes that safe.
    async fn apply_delta_batch(&self, ops: &[DeltaOp]) -> Result<(), MutationError> {
        for op in ops {
            self.apply_delta(op.account, op.resource, op.amount).await?;
        }
        Ok(())
    }
}

/// Maps an entity to the sub-account that holds its balances.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    /// Sub-account of `entity`.
    async fn resolve(&self, entity: EntityId) -> Result<Address, ResolveError>;
}
