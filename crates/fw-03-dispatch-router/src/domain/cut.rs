//! # Batch Edits
//!
//! A batch is a list of [`FacetCut`]s applied all-or-nothing.

use super::selector::Selector;
use crate::ports::Module;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::fmt;

/// What a cut does to its selectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutAction {
    /// Bind unbound selectors.
    Add,
    /// Re-bind bound selectors.
    Replace,
    /// Unbind bound selectors.
    Remove,
}

impl fmt::Display for CutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        })
    }
}

/// One edit: apply `action` to `selectors`, routing them to `module`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCut {
    /// Edit kind.
    pub action: CutAction,
    /// Target module. Zero for `Remove`.
    pub module: Address,
    /// Selectors affected.
    pub selectors: Vec<Selector>,
}

impl FacetCut {
    /// `Add` cut.
    #[must_use]
    pub fn add(module: Address, selectors: Vec<Selector>) -> Self {
        Self {
            action: CutAction::Add,
            module,
            selectors,
        }
    }

    /// `Replace` cut.
    #[must_use]
    pub fn replace(module: Address, selectors: Vec<Selector>) -> Self {
        Self {
            action: CutAction::Replace,
            module,
            selectors,
        }
    }

    /// `Remove` cut (module is the zero address).
    #[must_use]
    pub fn remove(selectors: Vec<Selector>) -> Self {
        Self {
            action: CutAction::Remove,
            module: Address::ZERO,
            selectors,
        }
    }

    /// `Add` cut for every selector a module declares.
    ///
    /// Tooling helper. The router itself never asks a module what it serves.
    #[must_use]
    pub fn add_all(module: Address, implementation: &dyn Module) -> Self {
        Self::add(module, implementation.selectors())
    }
}

/// Selectors touched by an applied batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutSummary {
    /// Newly bound.
    pub added: Vec<Selector>,
    /// Re-bound (including same-module no-ops).
    pub replaced: Vec<Selector>,
    /// Unbound.
    pub removed: Vec<Selector>,
}

impl CutSummary {
    /// Total selectors touched.
    #[must_use]
    pub fn total(&self) -> usize {
        self.added.len() + self.replaced.len() + self.removed.len()
    }
}
