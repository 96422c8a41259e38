//! # In-Memory Oracles
//!
//! Ledger, balances and resolver held in process. Each supports failure
//! injection so callers can exercise skip and isolation paths.

use crate::domain::{DeltaOp, EntityId, ResourceId, TrackId};
use crate::errors::{MutationError, OracleError, ResolveError};
use crate::ports::{AccountResolver, BalanceOracle, LedgerOracle};
use async_trait::async_trait;
use shared_types::{Address, U256};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

// =============================================================================
// LEDGER
// =============================================================================

/// Experience ledger. Unrecorded `(entity, track)` pairs read as zero.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    experience: RwLock<HashMap<(EntityId, TrackId), U256>>,
    unreadable: RwLock<HashSet<EntityId>>,
}

impl InMemoryLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record cumulative experience.
    pub fn set_experience(&self, entity: EntityId, track: TrackId, experience: U256) {
        if let Ok(mut map) = self.experience.write() {
            map.insert((entity, track), experience);
        }
    }

    /// Make every read for `entity` fail.
    pub fn fail_reads_for(&self, entity: EntityId) {
        if let Ok(mut set) = self.unreadable.write() {
            set.insert(entity);
        }
    }

    /// Undo [`InMemoryLedger::fail_reads_for`].
    pub fn clear_failures(&self) {
        if let Ok(mut set) = self.unreadable.write() {
            set.clear();
        }
    }
}

#[async_trait]
impl LedgerOracle for InMemoryLedger {
    async fn cumulative_experience(&self, entity: EntityId, track: TrackId) -> Result<U256, OracleError> {
        let unreadable = self.unreadable.read().map_err(|_| read_poisoned())?;
        if unreadable.contains(&entity) {
            return Err(OracleError::Unavailable(format!("ledger unreadable for {entity}")));
        }
        let map = self.experience.read().map_err(|_| read_poisoned())?;
        Ok(map.get(&(entity, track)).copied().unwrap_or_default())
    }
}

// =============================================================================
// BALANCES
// =============================================================================

/// Balance store. Batches are all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryBalances {
    balances: RwLock<HashMap<(Address, ResourceId), U256>>,
    rejecting: RwLock<HashSet<Address>>,
    unreadable: RwLock<HashSet<Address>>,
}

impl InMemoryBalances {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a balance.
    pub fn set_balance(&self, account: Address, resource: ResourceId, amount: U256) {
        if let Ok(mut map) = self.balances.write() {
            map.insert((account, resource), amount);
        }
    }

    /// Current balance, zero if unset.
    #[must_use]
    pub fn balance(&self, account: Address, resource: ResourceId) -> U256 {
        self.balances
            .read()
            .ok()
            .and_then(|map| map.get(&(account, resource)).copied())
            .unwrap_or_default()
    }

    /// Every recorded balance, ordered by account then resource.
    #[must_use]
    pub fn entries(&self) -> Vec<(Address, ResourceId, U256)> {
        let mut entries: Vec<(Address, ResourceId, U256)> = self
            .balances
            .read()
            .map(|map| map.iter().map(|(&(a, r), &v)| (a, r, v)).collect())
            .unwrap_or_default();
        entries.sort_by_key(|&(account, resource, _)| (account, resource));
        entries
    }

    /// Reject every mutation touching `account`.
    pub fn reject_mutations_for(&self, account: Address) {
        if let Ok(mut set) = self.rejecting.write() {
            set.insert(account);
        }
    }

    /// Fail every read for `account`.
    pub fn fail_reads_for(&self, account: Address) {
        if let Ok(mut set) = self.unreadable.write() {
            set.insert(account);
        }
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        if let Ok(mut set) = self.rejecting.write() {
            set.clear();
        }
        if let Ok(mut set) = self.unreadable.write() {
            set.clear();
        }
    }

    fn check_mutable(&self, account: Address) -> Result<(), MutationError> {
        let rejecting = self.rejecting.read().map_err(|_| write_poisoned())?;
        if rejecting.contains(&account) {
            return Err(MutationError::Rejected(format!("{account} rejects mutations")));
        }
        Ok(())
    }
}

fn credit(current: U256, amount: U256) -> Result<U256, MutationError> {
    current
        .checked_add(amount)
        .ok_or_else(|| MutationError::Rejected("balance overflow".into()))
}

#[async_trait]
impl BalanceOracle for InMemoryBalances {
    async fn get_balance(&self, account: Address, resource: ResourceId) -> Result<U256, OracleError> {
        let unreadable = self.unreadable.read().map_err(|_| read_poisoned())?;
        if unreadable.contains(&account) {
            return Err(OracleError::Unavailable(format!("balances unreadable for {account}")));
        }
        let map = self.balances.read().map_err(|_| read_poisoned())?;
        Ok(map.get(&(account, resource)).copied().unwrap_or_default())
    }

    async fn apply_delta(&self, account: Address, resource: ResourceId, amount: U256) -> Result<(), MutationError> {
        self.check_mutable(account)?;
        let mut map = self.balances.write().map_err(|_| write_poisoned())?;
        let slot = map.entry((account, resource)).or_default();
        *slot = credit(*slot, amount)?;
        debug!(%account, %resource, %amount, "delta applied");
        Ok(())
    }

    async fn apply_delta_batch(&self, ops: &[DeltaOp]) -> Result<(), MutationError> {
        for op in ops {
            self.check_mutable(op.account)?;
        }

        let mut map = self.balances.write().map_err(|_| write_poisoned())?;
        let mut staged: HashMap<(Address, ResourceId), U256> = HashMap::new();
        for op in ops {
            let key = (op.account, op.resource);
            let current = staged
                .get(&key)
                .or_else(|| map.get(&key))
                .copied()
                .unwrap_or_default();
            staged.insert(key, credit(current, op.amount)?);
        }
        map.extend(staged);
        debug!(ops = ops.len(), "delta batch applied");
        Ok(())
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Explicit `entity → account` bindings.
#[derive(Debug, Default)]
pub struct InMemoryResolver {
    accounts: RwLock<HashMap<EntityId, Address>>,
}

impl InMemoryResolver {
    /// No bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `entity` to `account`.
    pub fn bind(&self, entity: EntityId, account: Address) {
        if let Ok(mut map) = self.accounts.write() {
            map.insert(entity, account);
        }
    }
}

#[async_trait]
impl AccountResolver for InMemoryResolver {
    async fn resolve(&self, entity: EntityId) -> Result<Address, ResolveError> {
        let map = self.accounts.read().map_err(|_| ResolveError::Unavailable {
            entity,
            reason: "resolver lock poisoned".into(),
        })?;
        map.get(&entity).copied().ok_or_else(|| ResolveError::Unavailable {
            entity,
            reason: "no account bound".into(),
        })
    }
}

fn read_poisoned() -> OracleError {
    OracleError::Unavailable("store lock poisoned".into())
}

fn write_poisoned() -> MutationError {
    MutationError::Unavailable("store lock poisoned".into())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Address = Address::new([0xa1; 20]);
    const BOB: Address = Address::new([0xb0; 20]);

    fn op(account: Address, amount: u64) -> DeltaOp {
        DeltaOp {
            account,
            resource: ResourceId(1),
            amount: U256::from(amount),
        }
    }

    #[tokio::test]
    async fn test_unrecorded_experience_is_zero() {
        let ledger = InMemoryLedger::new();
        let xp = ledger.cumulative_experience(EntityId::from_u64(1), TrackId(0)).await.unwrap();
        assert!(xp.is_zero());

        ledger.fail_reads_for(EntityId::from_u64(1));
        assert!(ledger.cumulative_experience(EntityId::from_u64(1), TrackId(0)).await.is_err());
        ledger.clear_failures();
        assert!(ledger.cumulative_experience(EntityId::from_u64(1), TrackId(0)).await.is_ok());
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let balances = InMemoryBalances::new();
        balances.reject_mutations_for(BOB);

        let result = balances.apply_delta_batch(&[op(ALICE, 5), op(BOB, 5)]).await;
        assert!(matches!(&result, Err(MutationError::Rejected(reason)) if reason.contains(&BOB.to_hex())));
        assert!(balances.balance(ALICE, ResourceId(1)).is_zero());

        balances.clear_failures();
        balances.apply_delta_batch(&[op(ALICE, 5), op(ALICE, 2), op(BOB, 1)]).await.unwrap();
        assert_eq!(balances.balance(ALICE, ResourceId(1)), U256::from(7u64));
        assert_eq!(balances.balance(BOB, ResourceId(1)), U256::from(1u64));
    }

    #[tokio::test]
    async fn test_overflow_is_rejected() {
        let balances = InMemoryBalances::new();
        balances.set_balance(ALICE, ResourceId(1), U256::MAX);
        assert!(balances.apply_delta(ALICE, ResourceId(1), U256::one()).await.is_err());
        assert_eq!(balances.balance(ALICE, ResourceId(1)), U256::MAX);
    }

    #[tokio::test]
    async fn test_resolver_unbound_entity() {
        let resolver = InMemoryResolver::new();
        resolver.bind(EntityId::from_u64(1), ALICE);
        assert_eq!(resolver.resolve(EntityId::from_u64(1)).await.unwrap(), ALICE);
        assert!(matches!(
            resolver.resolve(EntityId::from_u64(2)).await,
            Err(ResolveError::Unavailable { .. })
        ));
    }
}
