//! # Runtime Flow
//!
//! What `fw-reconcile` does, driven from files in a temporary directory:
//! TOML config, JSON address book and JSON snapshot in; corrected snapshot
//! and a report out. A second pass over the written snapshot corrects
//! nothing.

#[cfg(test)]
mod tests {
    use std::path::Path;

    use fw_02_account_derivation::prelude::*;
    use fw_04_reconciliation::prelude::*;
    use fw_runtime::adapters::{BalanceEntry, ExperienceEntry, JsonAddressBook, Snapshot};
    use fw_runtime::{ReconcilerContainer, RuntimeConfig};
    use shared_types::{Address, AddressRegistry, U256};
    use tokio::sync::watch;

    const REGISTRY: Address = Address::new([0x33; 20]);
    const IMPLEMENTATION: Address = Address::new([0x43; 20]);
    const TOKEN: Address = Address::new([0x0c; 20]);

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn write_config(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("fw.toml");
        let text = format!(
            r#"
chain_id = 8453
address_book = "{book}"
snapshot = "{snapshot}"

[derivation]
implementation = "AccountV3"
implementation_version = 3

[engine]
max_batch_size = 2
initial_backoff_ms = 1
max_backoff_ms = 2

[[rules]]
resource = 1
track = 0
conversion_rate = 10

[[rules]]
resource = 2
track = 1
conversion_rate = 100
"#,
            book = dir.join("addresses.json").display(),
            snapshot = dir.join("snapshot.json").display(),
        );
        std::fs::write(&path, text).unwrap();
        path
    }

    fn write_address_book(dir: &Path) {
        let book = JsonAddressBook::open(dir.join("addresses.json")).unwrap();
        book.set("AccountRegistry", REGISTRY).unwrap();
        book.set("AccountV3", IMPLEMENTATION).unwrap();
        book.set("EntityToken", TOKEN).unwrap();
    }

    fn account(id: u64) -> Address {
        let record = ImplementationRecord::new("AccountV3", 3, IMPLEMENTATION, REGISTRY);
        AddressDeriver::from_record(&record).derive_from(
            IMPLEMENTATION,
            U256::zero(),
            U256::from(8453u64),
            TOKEN,
            U256::from(id),
        )
    }

    fn write_snapshot(dir: &Path) {
        let xp = |entity: u64, track: u32, experience: u64| ExperienceEntry {
            entity: U256::from(entity),
            track,
            experience: U256::from(experience),
        };
        let balance = |id: u64, resource: u64, balance: u64| BalanceEntry {
            account: account(id),
            resource,
            balance: U256::from(balance),
        };
        Snapshot {
            experience: vec![xp(1, 0, 1000), xp(1, 1, 500), xp(2, 0, 30), xp(3, 1, 1000)],
            balances: vec![balance(1, 1, 42), balance(2, 1, 3), balance(3, 2, 4)],
        }
        .save(&dir.join("snapshot.json"))
        .unwrap();
    }

    fn load(dir: &Path) -> (RuntimeConfig, Snapshot, ReconcilerContainer) {
        let config = RuntimeConfig::load(Some(write_config(dir).as_path())).unwrap();
        let book = JsonAddressBook::open(&config.address_book).unwrap();
        let snapshot = Snapshot::load(&config.snapshot).unwrap();
        let container = ReconcilerContainer::new(&config, &book, snapshot.ledger(), snapshot.balances()).unwrap();
        (config, snapshot, container)
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_scan_then_run_then_rerun() {
        let dir = tempfile::tempdir().unwrap();
        write_address_book(dir.path());
        write_snapshot(dir.path());

        let (config, snapshot, container) = load(dir.path());
        assert_eq!(container.record.version, 3);
        let entities = snapshot.entities();
        assert_eq!(entities.len(), 3);

        // Owed: #1 wood 100 (has 42), stone 5 (has 0); #2 wood 3 (has 3);
        // #3 stone 10 (has 4).
        let scan = container.engine.scan(entities.clone()).await;
        assert_eq!(scan.discrepancies.len(), 3);
        let total: U256 = scan.discrepancies.iter().fold(U256::zero(), |acc, c| acc + c.delta);
        assert_eq!(total, U256::from(58u64 + 5 + 6));

        let report = container.engine.run(entities.clone(), watch::channel(false).1).await;
        assert!(report.is_clean());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.batches.len(), 2);
        assert_eq!(report.applied_corrections().len(), 3);

        snapshot
            .with_balances(&container.balances)
            .save(&config.snapshot)
            .unwrap();

        // Report serializes for the CLI.
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "completed");

        // Second pass over the written snapshot.
        let (_, snapshot, container) = load(dir.path());
        let rerun = container.engine.run(snapshot.entities(), watch::channel(false).1).await;
        assert!(rerun.is_clean());
        assert!(rerun.batches.is_empty());
        assert_eq!(container.balances.balance(account(1), ResourceId(1)), U256::from(100u64));
        assert_eq!(container.balances.balance(account(1), ResourceId(2)), U256::from(5u64));
        assert_eq!(container.balances.balance(account(3), ResourceId(2)), U256::from(10u64));
    }

    #[tokio::test]
    async fn test_missing_address_book_entry_fails_wiring() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(dir.path());
        let book = JsonAddressBook::open(dir.path().join("addresses.json")).unwrap();
        book.set("AccountRegistry", REGISTRY).unwrap();

        let config = RuntimeConfig::load(Some(write_config(dir.path()).as_path())).unwrap();
        let snapshot = Snapshot::load(&config.snapshot).unwrap();
        let result = ReconcilerContainer::new(&config, &book, snapshot.ledger(), snapshot.balances());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cancelled_run_exits_with_code_two() {
        let dir = tempfile::tempdir().unwrap();
        write_address_book(dir.path());
        write_snapshot(dir.path());
        let (_, snapshot, container) = load(dir.path());

        let report = container.engine.run(snapshot.entities(), watch::channel(true).1).await;
        assert_eq!(report.exit_code(), 2);
        assert!(report.batches.is_empty());
        assert!(!report.not_submitted.is_empty());
        assert_eq!(container.balances.balance(account(1), ResourceId(1)), U256::from(42u64));
    }
}
