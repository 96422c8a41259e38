//! # Domain Layer
//!
//! Selectors, batch edits and the routing table.
//! NO I/O, NO async.

pub mod cut;
pub mod selector;
pub mod table;

pub use cut::*;
pub use selector::*;
pub use table::*;
