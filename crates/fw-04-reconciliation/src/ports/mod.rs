//! # Ports Layer
//!
//! - **Driven Ports (Outbound)**: `LedgerOracle`, `BalanceOracle`,
//!   `AccountResolver`
//! - No concrete implementations in this module

pub mod outbound;

pub use outbound::*;
