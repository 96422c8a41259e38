//! # Selector Table
//!
//! The `selector → module` map and its transition rules:
//!
//! | Action | Selector before | Module field | After |
//! |--------|-----------------|--------------|-------|
//! | Add | unbound | non-zero | bound to module |
//! | Replace | bound | non-zero | bound to module |
//! | Remove | bound | zero | unbound |
//!
//! A batch is validated against a staged copy and committed only if every
//! transition is legal, so later cuts in a batch see earlier ones.

use super::cut::{CutAction, CutSummary, FacetCut};
use super::selector::Selector;
use crate::errors::CutError;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::{BTreeMap, HashMap};

/// A module and the selectors routed to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFacet {
    /// Module address.
    pub module: Address,
    /// Selectors routed to it, sorted.
    pub selectors: Vec<Selector>,
}

/// Injectable selector routing table. Holds no global state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorTable {
    routes: HashMap<Selector, Address>,
}

impl SelectorTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch atomically. On error the table is unchanged.
    pub fn apply(&mut self, cuts: &[FacetCut]) -> Result<CutSummary, CutError> {
        if cuts.is_empty() {
            return Err(CutError::EmptyBatch);
        }

        let mut staged = self.routes.clone();
        let mut summary = CutSummary::default();

        for (cut_index, cut) in cuts.iter().enumerate() {
            validate_cut_shape(cut_index, cut)?;

            for selector in &cut.selectors {
                match cut.action {
                    CutAction::Add => {
                        if let Some(module) = staged.get(selector) {
                            return Err(CutError::SelectorAlreadyBound {
                                selector: *selector,
                                module: *module,
                            });
                        }
                        staged.insert(*selector, cut.module);
                        summary.added.push(*selector);
                    }
                    CutAction::Replace => {
                        let Some(bound) = staged.get_mut(selector) else {
                            return Err(CutError::SelectorNotBound {
                                selector: *selector,
                                action: cut.action,
                            });
                        };
                        *bound = cut.module;
                        summary.replaced.push(*selector);
                    }
                    CutAction::Remove => {
                        if staged.remove(selector).is_none() {
                            return Err(CutError::SelectorNotBound {
                                selector: *selector,
                                action: cut.action,
                            });
                        }
                        summary.removed.push(*selector);
                    }
                }
            }
        }

        self.routes = staged;
        Ok(summary)
    }

    /// Module serving `selector`.
    #[must_use]
    pub fn module_of(&self, selector: Selector) -> Option<Address> {
        self.routes.get(&selector).copied()
    }

    /// Selectors routed to `module`, sorted.
    #[must_use]
    pub fn selectors_of(&self, module: Address) -> Vec<Selector> {
        let mut selectors: Vec<Selector> = self
            .routes
            .iter()
            .filter(|(_, m)| **m == module)
            .map(|(s, _)| *s)
            .collect();
        selectors.sort();
        selectors
    }

    /// Every routed module with its selectors, sorted by module address.
    #[must_use]
    pub fn modules(&self) -> Vec<ModuleFacet> {
        let mut grouped: BTreeMap<Address, Vec<Selector>> = BTreeMap::new();
        for (selector, module) in &self.routes {
            grouped.entry(*module).or_default().push(*selector);
        }
        grouped
            .into_iter()
            .map(|(module, mut selectors)| {
                selectors.sort();
                ModuleFacet { module, selectors }
            })
            .collect()
    }

    /// Routes as a sorted map.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<Selector, Address> {
        self.routes.iter().map(|(s, m)| (*s, *m)).collect()
    }

    /// Number of routed selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True if nothing is routed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn validate_cut_shape(cut_index: usize, cut: &FacetCut) -> Result<(), CutError> {
    if cut.selectors.is_empty() {
        return Err(CutError::EmptySelectorList {
            cut_index,
            action: cut.action,
        });
    }
    match cut.action {
        CutAction::Add | CutAction::Replace if cut.module.is_zero() => Err(CutError::ZeroModule {
            cut_index,
            action: cut.action,
        }),
        CutAction::Remove if !cut.module.is_zero() => Err(CutError::RemoveWithModule {
            cut_index,
            module: cut.module,
        }),
        _ => Ok(()),
    }
}
