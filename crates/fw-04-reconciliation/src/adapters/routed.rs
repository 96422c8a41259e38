//! # Routed Oracles
//!
//! Ledger and balance oracles that go through a [`DispatchRouter`]. The
//! engine does not know which module answers; a diamond cut can move any of
//! these operations without touching the reconciler.

use super::calls::{
    decode_uint, encode_balance_of, encode_get_experience, encode_mint, encode_mint_batch,
};
use crate::domain::{DeltaOp, EntityId, ResourceId, TrackId};
use crate::errors::{MutationError, OracleError};
use crate::ports::{BalanceOracle, LedgerOracle};
use async_trait::async_trait;
use fw_03_dispatch_router::errors::{DispatchError, ModuleError};
use fw_03_dispatch_router::service::{DispatchRouter, RouterCall};
use shared_types::{Address, Bytes, U256};
use std::sync::Arc;

fn read_error(error: DispatchError) -> OracleError {
    match error {
        DispatchError::Module {
            source: ModuleError::InvalidCalldata(reason),
            ..
        } => OracleError::InvalidResponse(reason),
        other => OracleError::Unavailable(other.to_string()),
    }
}

fn write_error(error: DispatchError) -> MutationError {
    match error {
        DispatchError::Module {
            source: ModuleError::Unavailable(reason),
            ..
        } => MutationError::Unavailable(reason),
        DispatchError::Module { source, .. } => MutationError::Rejected(source.to_string()),
        other => MutationError::Unavailable(other.to_string()),
    }
}

async fn read_uint(router: &DispatchRouter, caller: Address, calldata: Bytes) -> Result<U256, OracleError> {
    let output = router
        .dispatch(RouterCall::new(caller, calldata))
        .await
        .map_err(read_error)?;
    decode_uint(output.as_slice()).ok_or_else(|| {
        OracleError::InvalidResponse(format!("expected a 32-byte word, got {} bytes", output.len()))
    })
}

/// Ledger read through the router.
pub struct RoutedLedger {
    router: Arc<DispatchRouter>,
    caller: Address,
}

impl RoutedLedger {
    /// Reads issued as `caller`.
    #[must_use]
    pub fn new(router: Arc<DispatchRouter>, caller: Address) -> Self {
        Self { router, caller }
    }
}

#[async_trait]
impl LedgerOracle for RoutedLedger {
    async fn cumulative_experience(&self, entity: EntityId, track: TrackId) -> Result<U256, OracleError> {
        read_uint(&self.router, self.caller, encode_get_experience(entity, track)).await
    }
}

/// Balance reads and credits through the router.
pub struct RoutedBalances {
    router: Arc<DispatchRouter>,
    caller: Address,
}

impl RoutedBalances {
    /// Calls issued as `caller`, which must be allowed to mint.
    #[must_use]
    pub fn new(router: Arc<DispatchRouter>, caller: Address) -> Self {
        Self { router, caller }
    }

    async fn send(&self, calldata: Bytes) -> Result<(), MutationError> {
        self.router
            .dispatch(RouterCall::new(self.caller, calldata))
            .await
            .map(|_| ())
            .map_err(write_error)
    }
}

#[async_trait]
impl BalanceOracle for RoutedBalances {
    async fn get_balance(&self, account: Address, resource: ResourceId) -> Result<U256, OracleError> {
        read_uint(&self.router, self.caller, encode_balance_of(account, resource)).await
    }

    async fn apply_delta(&self, account: Address, resource: ResourceId, amount: U256) -> Result<(), MutationError> {
        self.send(encode_mint(&DeltaOp {
            account,
            resource,
            amount,
        }))
        .await
    }

    async fn apply_delta_batch(&self, ops: &[DeltaOp]) -> Result<(), MutationError> {
        self.send(encode_mint_batch(ops)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::calls::{balance_of_selector, get_experience_selector};
    use crate::adapters::{InMemoryBalances, InMemoryLedger, ItemsModule, LedgerModule};
    use fw_03_dispatch_router::domain::FacetCut;

    const LEDGER_MODULE: Address = Address::new([0x1e; 20]);
    const ITEMS_MODULE: Address = Address::new([0x17; 20]);
    const RECONCILER: Address = Address::new([0x4e; 20]);
    const ALICE: Address = Address::new([0xa1; 20]);

    async fn router(ledger: Arc<InMemoryLedger>, balances: Arc<InMemoryBalances>) -> Arc<DispatchRouter> {
        let router = Arc::new(DispatchRouter::new());
        let ledger_module = Arc::new(LedgerModule::new(ledger));
        let items_module = Arc::new(ItemsModule::new(balances, [RECONCILER]));
        router.deploy_module(LEDGER_MODULE, ledger_module.clone()).await.unwrap();
        router.deploy_module(ITEMS_MODULE, items_module.clone()).await.unwrap();
        router
            .diamond_cut(vec![
                FacetCut::add_all(LEDGER_MODULE, ledger_module.as_ref()),
                FacetCut::add_all(ITEMS_MODULE, items_module.as_ref()),
            ])
            .await
            .unwrap();
        router
    }

    #[tokio::test]
    async fn test_routed_reads_and_writes() {
        let ledger = Arc::new(InMemoryLedger::new());
        let balances = Arc::new(InMemoryBalances::new());
        ledger.set_experience(EntityId::from_u64(1), TrackId(2), U256::from(1234u64));
        let router = router(ledger, balances.clone()).await;

        let routed_ledger = RoutedLedger::new(router.clone(), RECONCILER);
        let routed_balances = RoutedBalances::new(router, RECONCILER);

        assert_eq!(
            routed_ledger.cumulative_experience(EntityId::from_u64(1), TrackId(2)).await.unwrap(),
            U256::from(1234u64)
        );

        routed_balances.apply_delta(ALICE, ResourceId(5), U256::from(3u64)).await.unwrap();
        routed_balances
            .apply_delta_batch(&[
                DeltaOp {
                    account: ALICE,
                    resource: ResourceId(5),
                    amount: U256::from(4u64),
                },
                DeltaOp {
                    account: ALICE,
                    resource: ResourceId(6),
                    amount: U256::from(1u64),
                },
            ])
            .await
            .unwrap();
        assert_eq!(routed_balances.get_balance(ALICE, ResourceId(5)).await.unwrap(), U256::from(7u64));
        assert_eq!(balances.balance(ALICE, ResourceId(6)), U256::one());
    }

    #[tokio::test]
    async fn test_unauthorized_caller_is_rejected() {
        let router = router(Arc::new(InMemoryLedger::new()), Arc::new(InMemoryBalances::new())).await;
        let intruder = RoutedBalances::new(router, ALICE);
        assert!(matches!(
            intruder.apply_delta(ALICE, ResourceId(1), U256::one()).await,
            Err(MutationError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_unrouted_read_is_unavailable() {
        let router = Arc::new(DispatchRouter::new());
        let ledger = RoutedLedger::new(router.clone(), RECONCILER);
        assert!(matches!(
            ledger.cumulative_experience(EntityId::from_u64(1), TrackId(0)).await,
            Err(OracleError::Unavailable(_))
        ));

        // Routing only the balance read leaves the ledger unavailable.
        let balances = Arc::new(InMemoryBalances::new());
        let items = Arc::new(ItemsModule::new(balances, [RECONCILER]));
        router.deploy_module(ITEMS_MODULE, items).await.unwrap();
        router
            .diamond_cut(vec![FacetCut::add(ITEMS_MODULE, vec![balance_of_selector()])])
            .await
            .unwrap();
        assert!(router.facet_address(get_experience_selector()).await.is_none());
        let reader = RoutedBalances::new(router, RECONCILER);
        assert!(reader.get_balance(ALICE, ResourceId(1)).await.unwrap().is_zero());
    }
}
