//! # Router Flow
//!
//! Reconciliation where every ledger read, balance read and credit goes
//! through the dispatch router, and entities resolve to derived sub-accounts
//! that must be materialized:
//!
//! 1. Unmaterialized entities are skipped; the rest are corrected.
//! 2. A rejected cut leaves routing untouched.
//! 3. Replacing the items module mid-life keeps reconciliation working.
//! 4. Removing the batch credit forces per-item isolation, which still lands.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fw_02_account_derivation::prelude::*;
    use fw_03_dispatch_router::prelude::*;
    use fw_04_reconciliation::adapters::calls::{balance_of_selector, mint_batch_selector, mint_selector};
    use fw_04_reconciliation::prelude::*;
    use shared_types::{Address, U256};
    use tokio::sync::watch;

    const CHAIN_ID: u64 = 8453;
    const REGISTRY: Address = Address::new([0x33; 20]);
    const IMPLEMENTATION: Address = Address::new([0x43; 20]);
    const TOKEN: Address = Address::new([0x0c; 20]);
    const LEDGER_MODULE: Address = Address::new([0x1e; 20]);
    const ITEMS_V1: Address = Address::new([0x17; 20]);
    const ITEMS_V2: Address = Address::new([0x27; 20]);
    const RECONCILER: Address = Address::new([0x4e; 20]);

    const WOOD: ResourceId = ResourceId(1);
    const CHOPPING: TrackId = TrackId(0);

    type RoutedEngine = ReconciliationEngine<RoutedLedger, RoutedBalances, DerivedAccountResolver>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct World {
        record: ImplementationRecord,
        chain: Arc<InMemoryChain>,
        ledger: Arc<InMemoryLedger>,
        balances: Arc<InMemoryBalances>,
        router: Arc<DispatchRouter>,
    }

    impl World {
        /// Entities 1..=3 have accounts; entity 4 does not.
        async fn new() -> Self {
            let record = ImplementationRecord::new("AccountV3", 3, IMPLEMENTATION, REGISTRY);
            let deriver = AddressDeriver::from_record(&record);
            let chain = Arc::new(InMemoryChain::new());
            for id in 1..=3u64 {
                chain.create_account(&deriver, &key(&record, id)).unwrap();
            }

            let ledger = Arc::new(InMemoryLedger::new());
            let balances = Arc::new(InMemoryBalances::new());
            for (id, xp) in [(1u64, 1000u64), (2, 2000), (3, 50), (4, 500)] {
                ledger.set_experience(EntityId::from_u64(id), CHOPPING, U256::from(xp));
            }
            balances.set_balance(account(&record, 1), WOOD, U256::from(42u64));
            balances.set_balance(account(&record, 2), WOOD, U256::from(250u64));

            let router = Arc::new(DispatchRouter::new());
            let ledger_module = Arc::new(LedgerModule::new(ledger.clone()));
            let items = Arc::new(ItemsModule::new(balances.clone(), [RECONCILER]));
            router.deploy_module(LEDGER_MODULE, ledger_module.clone()).await.unwrap();
            router.deploy_module(ITEMS_V1, items.clone()).await.unwrap();
            router
                .diamond_cut(vec![
                    FacetCut::add_all(LEDGER_MODULE, ledger_module.as_ref()),
                    FacetCut::add_all(ITEMS_V1, items.as_ref()),
                ])
                .await
                .unwrap();

            Self {
                record,
                chain,
                ledger,
                balances,
                router,
            }
        }

        fn engine(&self) -> RoutedEngine {
            let resolver = DerivedAccountResolver::new(self.record.clone(), U256::from(CHAIN_ID), TOKEN)
                .with_code_reader(self.chain.clone());
            let config = EngineConfig {
                max_batch_size: 2,
                read_concurrency: 4,
                max_submit_attempts: 2,
                initial_backoff_ms: 1,
                max_backoff_ms: 2,
                submit_timeout_ms: 1_000,
                batch_delay_ms: 0,
            };
            ReconciliationEngine::new(
                Arc::new(RoutedLedger::new(self.router.clone(), RECONCILER)),
                Arc::new(RoutedBalances::new(self.router.clone(), RECONCILER)),
                Arc::new(resolver),
                ReconciliationPolicy::new(vec![ResourceRule::new(WOOD, CHOPPING, U256::from(10u64))]).unwrap(),
                config,
            )
            .unwrap()
        }

        fn wood(&self, id: u64) -> U256 {
            self.balances.balance(account(&self.record, id), WOOD)
        }
    }

    fn key(record: &ImplementationRecord, id: u64) -> SubAccountKey {
        AddressDeriver::key_for(record, U256::from(CHAIN_ID), TOKEN, U256::from(id), U256::zero())
    }

    fn account(record: &ImplementationRecord, id: u64) -> Address {
        AddressDeriver::from_record(record).derive(&key(record, id))
    }

    fn entities() -> Vec<EntityId> {
        (1..=4).map(EntityId::from_u64).collect()
    }

    fn live() -> watch::Receiver<bool> {
        watch::channel(false).1
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_routed_run_corrects_materialized_entities() {
        let world = World::new().await;
        let engine = world.engine();

        let report = engine.run(entities(), live()).await;

        assert_eq!(report.entities_scanned, 4);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].entity, EntityId::from_u64(4));
        assert!(matches!(report.skipped[0].reason, SkipReason::NotMaterialized { .. }));
        assert_eq!(report.status, RunStatus::CompletedWithFailures);

        // 1: 100 owed, had 42. 2: over-credited, untouched. 3: 5 owed, had 0.
        assert_eq!(world.wood(1), U256::from(100u64));
        assert_eq!(world.wood(2), U256::from(250u64));
        assert_eq!(world.wood(3), U256::from(5u64));
        assert_eq!(
            report.corrected_entities().into_iter().collect::<Vec<_>>(),
            vec![EntityId::from_u64(1), EntityId::from_u64(3)]
        );

        // Materializing entity 4 lets the next run pick it up, and only it.
        world
            .chain
            .create_account(&AddressDeriver::from_record(&world.record), &key(&world.record, 4))
            .unwrap();
        let second = engine.run(entities(), live()).await;
        assert!(second.is_clean());
        assert_eq!(
            second.corrected_entities().into_iter().collect::<Vec<_>>(),
            vec![EntityId::from_u64(4)]
        );
        assert_eq!(world.wood(4), U256::from(50u64));
    }

    #[tokio::test]
    async fn test_rejected_cut_leaves_routing_untouched() {
        let world = World::new().await;
        let items_v2 = Arc::new(ItemsModule::new(world.balances.clone(), [RECONCILER]));
        world.router.deploy_module(ITEMS_V2, items_v2).await.unwrap();
        let before = world.router.table_snapshot().await;

        let result = world
            .router
            .diamond_cut(vec![
                FacetCut::replace(ITEMS_V2, vec![mint_selector(), mint_batch_selector()]),
                FacetCut::add(ITEMS_V2, vec![balance_of_selector()]),
            ])
            .await;

        assert!(matches!(result, Err(CutError::SelectorAlreadyBound { .. })));
        assert_eq!(world.router.table_snapshot().await, before);
        assert_eq!(world.router.facet_address(mint_selector()).await, Some(ITEMS_V1));
    }

    #[tokio::test]
    async fn test_replaced_items_module_keeps_reconciling() {
        let world = World::new().await;
        let engine = world.engine();
        engine.run(entities(), live()).await;

        let items_v2 = Arc::new(ItemsModule::new(world.balances.clone(), [RECONCILER]));
        world.router.deploy_module(ITEMS_V2, items_v2).await.unwrap();
        let receipt = world
            .router
            .diamond_cut(vec![FacetCut::replace(
                ITEMS_V2,
                vec![balance_of_selector(), mint_selector(), mint_batch_selector()],
            )])
            .await
            .unwrap();
        assert_eq!(receipt.summary.replaced.len(), 3);
        assert!(world.router.facet_selectors(ITEMS_V1).await.is_empty());

        // Entity 1 earns more; the new module serves the correction.
        world
            .ledger
            .set_experience(EntityId::from_u64(1), CHOPPING, U256::from(1500u64));
        let report = engine.run(entities(), live()).await;
        assert_eq!(world.wood(1), U256::from(150u64));
        assert_eq!(report.applied_corrections().len(), 1);
        assert_eq!(report.applied_corrections()[0].delta, U256::from(50u64));
    }

    #[tokio::test]
    async fn test_unrouted_batch_credit_falls_back_to_items() {
        let world = World::new().await;
        world
            .router
            .diamond_cut(vec![FacetCut::remove(vec![mint_batch_selector()])])
            .await
            .unwrap();
        let engine = world.engine();

        let report = engine.run(entities(), live()).await;

        let batch = &report.batches[0];
        assert_eq!(batch.attempts, 2);
        assert_eq!(batch.outcome, BatchOutcome::Applied);
        assert!(batch.items.iter().all(|i| i.status == ItemStatus::Applied));
        assert_eq!(world.wood(1), U256::from(100u64));
        assert_eq!(world.wood(3), U256::from(5u64));
        assert!(world.router.stats().await.calls_unrouted >= 2);
    }
}
