//! # FW-04 Reconciliation - Ledger-Derived Balance Repair
//!
//! **Component ID:** 4
//! **Depends on:** `fw-02-account-derivation` (entity → sub-account),
//! `fw-03-dispatch-router` (routed oracles).
//!
//! ## Purpose
//!
//! Balances are derived from an append-only experience ledger:
//! `expected = floor(experience / conversion_rate)`. When a balance falls
//! behind, the engine submits the difference as a credit. It never debits:
//! a balance above `expected` may have been spent legitimately and is left
//! alone.
//!
//! ## Run Shape
//!
//! | Phase | Concurrency | Failure handling |
//! |-------|-------------|------------------|
//! | Plan (resolve, read ledger, read balances) | `read_concurrency` entities | entity skipped with a reason |
//! | Submit (batches of `max_batch_size`) | one batch at a time | backoff, re-read, retry, then isolate items |
//! | Report | n/a | per-item status, `not_submitted` on cancel |
//!
//! ## Idempotence
//!
//! Every delta is computed from a fresh read, including on retry. A run
//! repeated over unchanged state plans zero corrections, so a cancelled or
//! failed run is resumed simply by running again.

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
    pub use crate::adapters::{
        DerivedAccountResolver, InMemoryBalances, InMemoryLedger, InMemoryResolver, ItemsModule,
        LedgerModule, RoutedBalances, RoutedLedger,
    };
    pub use crate::domain::{
        backoff_delay_ms, batch_corrections, expected_quantity, plan_entity_corrections,
        BatchOutcome, BatchReport, Correction, CorrectionBatch, DeltaOp, EntityId, EntityPlan,
        ItemReport, ItemStatus, ReconciliationPolicy, ResourceId, ResourceRule, RunReport,
        RunStatus, ScanReport, SkipReason, SkippedEntity, TrackId,
    };
    pub use crate::errors::{EngineConfigError, MutationError, OracleError, PolicyError, ResolveError};
    pub use crate::ports::{AccountResolver, BalanceOracle, LedgerOracle};
    pub use crate::service::{EngineConfig, EngineStats, ReconciliationEngine};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID.
pub const COMPONENT_ID: u8 = 4;
