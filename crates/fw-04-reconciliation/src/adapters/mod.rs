//! # Adapters Layer
//!
//! - `memory`: in-process ledger, balances and resolver
//! - `resolver`: entity → derived sub-account
//! - `calls`: oracle selectors and calldata
//! - `routed`: oracles reached through a dispatch router
//! - `modules`: router modules serving those calls

pub mod calls;
pub mod memory;
pub mod modules;
pub mod resolver;
pub mod routed;

pub use memory::{InMemoryBalances, InMemoryLedger, InMemoryResolver};
pub use modules::{ItemsModule, LedgerModule};
pub use resolver::DerivedAccountResolver;
pub use routed::{RoutedBalances, RoutedLedger};
