//! # Derivation Flow
//!
//! Footer codec, address derivation and the chain together:
//!
//! 1. An account created under a record inspects as materialized and its
//!    deployed footer decodes to the binding it was derived from.
//! 2. A record whose layout misreads the footer is caught as a stale binding,
//!    with the shifted legacy view available for diagnosis.
//! 3. Switching implementations moves every owner to a new address.

#[cfg(test)]
mod tests {
    use fw_01_binding_codec::prelude::*;
    use fw_02_account_derivation::prelude::*;
    use shared_types::{Address, AddressRegistry, InMemoryAddressRegistry, U256};

    const CHAIN_ID: u64 = 8453;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn book() -> InMemoryAddressRegistry {
        InMemoryAddressRegistry::from_entries([
            ("AccountRegistry", Address::new([0x33; 20])),
            ("AccountV2", Address::new([0x42; 20])),
            ("AccountV3", Address::new([0x43; 20])),
            ("EntityToken", Address::new([0x0c; 20])),
        ])
    }

    fn record(book: &dyn AddressRegistry, name: &str, version: u32) -> ImplementationRecord {
        ImplementationRecord::new(
            name,
            version,
            book.get(name).unwrap(),
            book.get("AccountRegistry").unwrap(),
        )
    }

    fn key(book: &dyn AddressRegistry, record: &ImplementationRecord, owner_id: u64) -> SubAccountKey {
        AddressDeriver::key_for(
            record,
            U256::from(CHAIN_ID),
            book.get("EntityToken").unwrap(),
            U256::from(owner_id),
            U256::zero(),
        )
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_created_account_reads_back_its_binding() {
        let book = book();
        let record = record(&book, "AccountV3", 3);
        let deriver = AddressDeriver::from_record(&record);
        let chain = InMemoryChain::new();
        let key = key(&book, &record, 42);

        let before = deriver.inspect(&key, &chain).await.unwrap();
        assert_eq!(
            before,
            AccountStatus::NotMaterialized {
                address: deriver.derive(&key)
            }
        );

        let account = chain.create_account(&deriver, &key).unwrap();
        let after = deriver.inspect(&key, &chain).await.unwrap();
        assert_eq!(after, AccountStatus::Materialized(account.clone()));

        let code = chain.get_code(account.address).await.unwrap();
        assert_eq!(implementation_from_runtime(code.as_slice()), Some(record.implementation));
        let decoded = BindingCodec::runtime().decode(code.as_slice());
        assert!(decoded.matches(&account.footer));
        assert_eq!(decoded.owner_id(), Some(U256::from(42u64)));
        assert_eq!(decoded.chain_id(), Some(U256::from(CHAIN_ID)));
    }

    #[tokio::test]
    async fn test_legacy_reader_is_flagged_not_trusted() {
        let book = book();
        let legacy = record(&book, "AccountV2", 2).with_layout(FooterLayout::LEGACY_RUNTIME);
        let deriver = AddressDeriver::from_record(&legacy);
        let chain = InMemoryChain::new();
        let key = key(&book, &legacy, 7);
        chain.create_account(&deriver, &key).unwrap();

        let AccountStatus::StaleBinding(stale) = deriver.inspect(&key, &chain).await.unwrap() else {
            panic!("legacy layout must not inspect as materialized");
        };
        assert_eq!(stale.reason, StaleReason::NonConformingLayout);
        // The three-field reader sees the salt where it expects the chain id.
        assert_eq!(stale.legacy_view.chain_id(), Some(U256::zero()));
        assert_eq!(stale.legacy_view.owner_id(), Some(book.get("EntityToken").unwrap().to_u256()));
        assert_eq!(stale.found_footer.owner_id(), Some(U256::from(7u64)));

        assert!(matches!(
            deriver.ensure_materialized(&key, &chain).await,
            Err(DerivationError::StaleBinding(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_code_at_derived_address() {
        let book = book();
        let record = record(&book, "AccountV3", 3);
        let deriver = AddressDeriver::from_record(&record);
        let chain = InMemoryChain::new();
        let key = key(&book, &record, 9);
        let address = deriver.derive(&key);

        let other = runtime_code_for_owner(&book, &record, 10);
        chain.deploy_code(address, other).unwrap();

        let AccountStatus::StaleBinding(stale) = deriver.inspect(&key, &chain).await.unwrap() else {
            panic!("foreign footer must be stale");
        };
        assert_eq!(stale.reason, StaleReason::FooterMismatch);
        assert_eq!(stale.found_implementation, Some(record.implementation));
    }

    fn runtime_code_for_owner(
        book: &dyn AddressRegistry,
        record: &ImplementationRecord,
        owner_id: u64,
    ) -> shared_types::Bytes {
        let k = key(book, record, owner_id);
        runtime_code(record.implementation, &encode_footer(&k.footer()))
    }

    #[tokio::test]
    async fn test_upgrade_moves_every_owner() {
        let book = book();
        let v2 = record(&book, "AccountV2", 2);
        let v3 = record(&book, "AccountV3", 3);
        let owners: Vec<U256> = (1..=3u64).map(U256::from).collect();

        let plan = plan_migration(
            &v2,
            &v3,
            U256::from(CHAIN_ID),
            U256::zero(),
            book.get("EntityToken").unwrap(),
            &owners,
        );
        assert_eq!(plan.len(), 3);
        for entry in &plan {
            assert_ne!(entry.from_address, entry.to_address);
        }

        // New accounts are created at the planned addresses.
        let chain = InMemoryChain::new();
        let deriver = AddressDeriver::from_record(&v3);
        for entry in &plan {
            let k = AddressDeriver::key_for(
                &v3,
                U256::from(CHAIN_ID),
                book.get("EntityToken").unwrap(),
                entry.owner_id,
                U256::zero(),
            );
            assert_eq!(chain.create_account(&deriver, &k).unwrap().address, entry.to_address);
        }
        assert_eq!(chain.len(), 3);

        assert!(plan_migration(&v3, &v3, U256::from(CHAIN_ID), U256::zero(), Address::ZERO, &owners).is_empty());
    }
}
