//! # FW-03 Dispatch Router - Selector-Routed Modules
//!
//! **Component ID:** 3
//! **Depends on:** `shared-types` only.
//!
//! ## Purpose
//!
//! One stable entry point whose behavior is composed from independently
//! deployed modules. Each call's first four calldata bytes (the selector)
//! pick the module; caller, value and calldata are forwarded unchanged.
//!
//! ## Batch Edits
//!
//! The routing table changes only through [`DispatchRouter::diamond_cut`],
//! which takes a list of `Add` / `Replace` / `Remove` cuts and applies all of
//! them or none. A failed batch leaves the table exactly as it was, so there
//! is never a half-upgraded router to recover from.
//!
//! ```text
//! calldata ──► selector ──► SelectorTable ──► module address ──► Module::handle
//!                                 ▲
//!              diamond_cut([FacetCut]) (atomic)
//! ```
//!
//! ## Module Identity
//!
//! Modules are deployed by address and never change once deployed. To change
//! behavior, deploy a new module and `Replace` the selectors onto it.
//!
//! [`DispatchRouter::diamond_cut`]: service::DispatchRouter::diamond_cut

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::domain::{
        CutAction, CutSummary, FacetCut, ModuleFacet, Selector, SelectorTable,
    };
    pub use crate::errors::{CutError, DeployError, DispatchError, ModuleError};
    pub use crate::ports::{DynModule, Module, ModuleCall};
    pub use crate::service::{CutReceipt, DispatchRouter, RouterCall, RouterStats};
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID.
pub const COMPONENT_ID: u8 = 3;
