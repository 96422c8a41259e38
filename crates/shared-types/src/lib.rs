//! # Shared Types Crate
//!
//! Value objects shared by every Facetwork crate, plus the address-registry
//! collaborator port.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Address`, `Hash`, `Bytes` and `U256` are
//!   defined once here; component crates never redefine them.
//! - **Text Form**: addresses and hashes serialize as `0x`-prefixed hex so
//!   address books, snapshots and reports stay human-readable.
//! - **No Embedded Registry**: the name → address mapping is a port that the
//!   caller injects; no crate holds a global default.

pub mod errors;
pub mod primitives;
pub mod registry;

pub use errors::*;
pub use primitives::*;
pub use registry::*;
