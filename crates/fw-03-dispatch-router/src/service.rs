//! # Dispatch Router Service
//!
//! Single entry point that forwards each call to the module its selector is
//! routed to, plus the governance surface that edits the routing table.
//!
//! ## Concurrency
//!
//! - Batch edits take the table write lock for the whole validate-and-commit,
//!   so two edits never interleave.
//! - Dispatch takes the read lock only to look up the route; the module call
//!   runs without any lock held.

use crate::domain::{CutAction, CutSummary, FacetCut, ModuleFacet, Selector, SelectorTable};
use crate::errors::{CutError, DeployError, DispatchError};
use crate::ports::{DynModule, ModuleCall};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Bytes, U256};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// A call arriving at the router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterCall {
    /// Caller identity.
    pub caller: Address,
    /// Attached value.
    pub value: U256,
    /// Calldata; the first four bytes select the operation.
    pub calldata: Bytes,
}

impl RouterCall {
    /// Call with no value attached.
    #[must_use]
    pub fn new(caller: Address, calldata: Bytes) -> Self {
        Self {
            caller,
            value: U256::zero(),
            calldata,
        }
    }
}

/// Result of an applied batch edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutReceipt {
    /// Selectors touched.
    pub summary: CutSummary,
    /// Routed selectors after the edit.
    pub selectors_bound: usize,
}

/// Router statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    /// Batch edits committed.
    pub cuts_applied: u64,
    /// Batch edits rejected.
    pub cuts_rejected: u64,
    /// Calls forwarded to a module.
    pub calls_dispatched: u64,
    /// Calls with no route or too-short calldata.
    pub calls_unrouted: u64,
}

/// Selector-routed dispatcher over a set of deployed modules.
pub struct DispatchRouter {
    /// Routing table.
    table: Arc<RwLock<SelectorTable>>,
    /// Deployed modules by address.
    modules: Arc<RwLock<HashMap<Address, DynModule>>>,
    /// Statistics.
    stats: Arc<RwLock<RouterStats>>,
}

impl Default for DispatchRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchRouter {
    /// Router with an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table(SelectorTable::new())
    }

    /// Router over an existing table.
    #[must_use]
    pub fn with_table(table: SelectorTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
            modules: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(RouterStats::default())),
        }
    }

    /// Make a module reachable at `address`.
    ///
    /// Deploying routes nothing; a batch edit must bind selectors to it.
    pub async fn deploy_module(&self, address: Address, module: DynModule) -> Result<(), DeployError> {
        if address.is_zero() {
            return Err(DeployError::ZeroAddress);
        }
        let mut modules = self.modules.write().await;
        if modules.contains_key(&address) {
            return Err(DeployError::AddressInUse(address));
        }
        modules.insert(address, module);
        info!(module = %address, "module deployed");
        Ok(())
    }

    /// True if a module is deployed at `address`.
    pub async fn is_deployed(&self, address: Address) -> bool {
        self.modules.read().await.contains_key(&address)
    }

    /// Apply a batch of edits atomically.
    #[instrument(skip_all, fields(cuts = cuts.len()))]
    pub async fn diamond_cut(&self, cuts: Vec<FacetCut>) -> Result<CutReceipt, CutError> {
        let mut table = self.table.write().await;

        let result = match self.check_modules_deployed(&cuts).await {
            Ok(()) => table.apply(&cuts),
            Err(e) => Err(e),
        };

        let mut stats = self.stats.write().await;
        match result {
            Ok(summary) => {
                stats.cuts_applied += 1;
                info!(
                    added = summary.added.len(),
                    replaced = summary.replaced.len(),
                    removed = summary.removed.len(),
                    "batch edit applied"
                );
                Ok(CutReceipt {
                    summary,
                    selectors_bound: table.len(),
                })
            }
            Err(e) => {
                stats.cuts_rejected += 1;
                warn!(error = %e, "batch edit rejected");
                Err(e)
            }
        }
    }

    async fn check_modules_deployed(&self, cuts: &[FacetCut]) -> Result<(), CutError> {
        let modules = self.modules.read().await;
        for cut in cuts {
            if cut.action == CutAction::Remove || cut.module.is_zero() {
                continue;
            }
            if !modules.contains_key(&cut.module) {
                if let Some(selector) = cut.selectors.first() {
                    return Err(CutError::ModuleNotDeployed {
                        module: cut.module,
                        selector: *selector,
                    });
                }
            }
        }
        Ok(())
    }

    /// Forward a call to the module routed for its selector.
    pub async fn dispatch(&self, call: RouterCall) -> Result<Bytes, DispatchError> {
        let Some(selector) = Selector::from_calldata(call.calldata.as_slice()) else {
            self.stats.write().await.calls_unrouted += 1;
            return Err(DispatchError::CalldataTooShort {
                len: call.calldata.len(),
            });
        };

        let route = self.table.read().await.module_of(selector);
        let target = match route {
            Some(address) => self
                .modules
                .read()
                .await
                .get(&address)
                .cloned()
                .map(|module| (address, module)),
            None => None,
        };
        let Some((address, module)) = target else {
            self.stats.write().await.calls_unrouted += 1;
            debug!(%selector, "no route");
            return Err(DispatchError::NoImplementation(selector));
        };

        self.stats.write().await.calls_dispatched += 1;
        module
            .handle(ModuleCall {
                selector,
                caller: call.caller,
                value: call.value,
                calldata: call.calldata,
            })
            .await
            .map_err(|source| DispatchError::Module {
                selector,
                module: address,
                source,
            })
    }

    /// Module serving `selector`.
    pub async fn facet_address(&self, selector: Selector) -> Option<Address> {
        self.table.read().await.module_of(selector)
    }

    /// Every routed module with its selectors.
    pub async fn facets(&self) -> Vec<ModuleFacet> {
        self.table.read().await.modules()
    }

    /// Selectors routed to `module`.
    pub async fn facet_selectors(&self, module: Address) -> Vec<Selector> {
        self.table.read().await.selectors_of(module)
    }

    /// Sorted copy of the routes.
    pub async fn table_snapshot(&self) -> BTreeMap<Selector, Address> {
        self.table.read().await.snapshot()
    }

    /// Current statistics.
    pub async fn stats(&self) -> RouterStats {
        self.stats.read().await.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
