//! # Facetwork Test Suite
//!
//! Cross-component flows that no single crate can test on its own.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── derivation_flow.rs  # codec + deriver + chain: materialize, detect, migrate
//!     ├── router_flow.rs      # reconciliation through routed modules, live upgrades
//!     └── runtime_flow.rs     # config + address book + snapshot, end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fw-tests
//! cargo test -p fw-tests integration::router_flow
//! ```

#![allow(dead_code)]

pub mod integration;
