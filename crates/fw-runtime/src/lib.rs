//! # Facetwork Runtime
//!
//! Everything around the reconciliation engine that touches the outside
//! world: configuration, logging, the address book and snapshots.
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig`: TOML file, `FW_*` overrides, validation
//! - `telemetry` - `tracing-subscriber` bootstrap
//! - `adapters/` - `JsonAddressBook`, JSON `Snapshot` oracles
//! - `container` - wires the engine from the above
//!
//! ## Startup Sequence (`fw-reconcile`)
//!
//! 1. Load configuration (file, then environment)
//! 2. Initialize logging
//! 3. Open the address book and resolve the implementation record
//! 4. Load the snapshot into ledger and balance oracles
//! 5. Scan, or run with Ctrl-C wired to cancellation
//! 6. Persist balances, print the report, exit with its code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod config;
pub mod container;
pub mod errors;
pub mod telemetry;

pub use config::{DerivationConfig, RuleConfig, RuntimeConfig};
pub use container::{ReconcilerContainer, SnapshotEngine};
pub use errors::{ConfigError, SnapshotError, WiringError};
pub use telemetry::init_tracing;
