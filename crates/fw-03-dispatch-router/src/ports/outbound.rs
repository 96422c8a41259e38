//! # Driven Ports (SPI - Outbound)
//!
//! A module is an independently deployed unit of behavior. The router holds
//! modules by address and forwards calls to whichever one the selector table
//! names.

use crate::domain::Selector;
use crate::errors::ModuleError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Bytes, U256};
use std::sync::Arc;

/// A call as a module receives it. Caller, value and calldata are forwarded
/// unchanged from the router's entry point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCall {
    /// Selector that routed the call.
    pub selector: Selector,
    /// Original caller.
    pub caller: Address,
    /// Value attached to the call.
    pub value: U256,
    /// Full calldata, selector included.
    pub calldata: Bytes,
}

/// Capability implementing a set of operations.
#[async_trait]
pub trait Module: Send + Sync {
    /// Selectors this module implements. Used only by tooling that builds
    /// cuts; routing is decided by the table.
    fn selectors(&self) -> Vec<Selector>;

    /// Handle one routed call.
    async fn handle(&self, call: ModuleCall) -> Result<Bytes, ModuleError>;
}

/// Shared module handle.
pub type DynModule = Arc<dyn Module>;
