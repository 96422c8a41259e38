//! # Adapters
//!
//! File-backed address book and ledger/balance snapshots.

pub mod address_book;
pub mod snapshot;

pub use address_book::JsonAddressBook;
pub use snapshot::{BalanceEntry, ExperienceEntry, Snapshot};
