//! # Reconciler Container
//!
//! Resolves named addresses, builds the implementation record and the
//! resolver, and hands the engine its oracles.

use crate::config::RuntimeConfig;
use crate::errors::WiringError;
use fw_02_account_derivation::domain::ImplementationRecord;
use fw_04_reconciliation::adapters::{DerivedAccountResolver, InMemoryBalances, InMemoryLedger};
use fw_04_reconciliation::service::ReconciliationEngine;
use shared_types::{AddressRegistry, U256};
use std::sync::Arc;
use tracing::info;

/// Engine over snapshot oracles and derived sub-accounts.
pub type SnapshotEngine = ReconciliationEngine<InMemoryLedger, InMemoryBalances, DerivedAccountResolver>;

/// Everything a run needs.
pub struct ReconcilerContainer {
    /// The engine.
    pub engine: SnapshotEngine,
    /// Balances the engine writes to, for persisting afterwards.
    pub balances: Arc<InMemoryBalances>,
    /// Implementation the sub-accounts are derived under.
    pub record: ImplementationRecord,
}

impl ReconcilerContainer {
    /// Wire the engine from configuration, the address book and loaded oracles.
    pub fn new(
        config: &RuntimeConfig,
        registry: &dyn AddressRegistry,
        ledger: InMemoryLedger,
        balances: InMemoryBalances,
    ) -> Result<Self, WiringError> {
        let derivation = &config.derivation;
        let layout = config.layout()?;
        let record = ImplementationRecord::new(
            derivation.implementation.clone(),
            derivation.implementation_version,
            registry.get(&derivation.implementation)?,
            registry.get(&derivation.registry)?,
        )
        .with_layout(layout);
        let owner_contract = registry.get(&derivation.owner_contract)?;

        info!(
            implementation = %record.implementation,
            version = record.version,
            registry = %record.registry,
            %owner_contract,
            chain_id = config.chain_id,
            layout = %layout,
            "sub-account derivation configured"
        );

        let resolver = DerivedAccountResolver::new(record.clone(), U256::from(config.chain_id), owner_contract)
            .with_salt(U256::from(derivation.salt));
        let balances = Arc::new(balances);
        let engine = ReconciliationEngine::new(
            Arc::new(ledger),
            balances.clone(),
            Arc::new(resolver),
            config.policy()?,
            config.engine.clone(),
        )
        .map_err(|e| WiringError::Config(e.into()))?;

        Ok(Self {
            engine,
            balances,
            record,
        })
    }
}
