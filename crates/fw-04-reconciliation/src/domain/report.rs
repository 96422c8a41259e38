//! # Reports
//!
//! Planning results and the structured run report. Every run yields one;
//! a partial success is always visible in it.

use super::correction::Correction;
use super::value_objects::{EntityId, ResourceId, TrackId};
use crate::errors::{OracleError, ResolveError};
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// =============================================================================
// PLANNING
// =============================================================================

/// Why an entity was left out of a run. Retried on the next run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Sub-account exists with the wrong binding.
    StaleBinding {
        /// Derived address.
        address: Address,
        /// Classification.
        detail: String,
    },
    /// Sub-account not created yet.
    NotMaterialized {
        /// Derived address.
        address: Address,
    },
    /// Resolver backend failed.
    ResolverUnavailable {
        /// Backend message.
        detail: String,
    },
    /// Ledger read failed.
    LedgerUnavailable {
        /// Track being read.
        track: TrackId,
        /// Backend message.
        detail: String,
    },
    /// Balance read failed.
    BalanceUnavailable {
        /// Resource being read.
        resource: ResourceId,
        /// Backend message.
        detail: String,
    },
}

impl SkipReason {
    /// Reason for a ledger read failure.
    #[must_use]
    pub fn ledger(track: TrackId, error: &OracleError) -> Self {
        Self::LedgerUnavailable {
            track,
            detail: error.to_string(),
        }
    }

    /// Reason for a balance read failure.
    #[must_use]
    pub fn balance(resource: ResourceId, error: &OracleError) -> Self {
        Self::BalanceUnavailable {
            resource,
            detail: error.to_string(),
        }
    }
}

impl From<ResolveError> for SkipReason {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::StaleBinding {
                address, reason, ..
            } => Self::StaleBinding {
                address,
                detail: reason,
            },
            ResolveError::NotMaterialized { address, .. } => Self::NotMaterialized { address },
            ResolveError::Unavailable { reason, .. } => Self::ResolverUnavailable { detail: reason },
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleBinding { address, detail } => write!(f, "stale binding at {address}: {detail}"),
            Self::NotMaterialized { address } => write!(f, "sub-account {address} not materialized"),
            Self::ResolverUnavailable { detail } => write!(f, "resolver unavailable: {detail}"),
            Self::LedgerUnavailable { track, detail } => write!(f, "ledger read failed for {track}: {detail}"),
            Self::BalanceUnavailable { resource, detail } => {
                write!(f, "balance read failed for {resource}: {detail}")
            }
        }
    }
}

/// Entity left out of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntity {
    /// Entity.
    pub entity: EntityId,
    /// Reason.
    pub reason: SkipReason,
}

/// Planning outcome for one entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityPlan {
    /// Reads succeeded. `corrections` may be empty.
    Planned {
        /// Entity.
        entity: EntityId,
        /// Resolved sub-account.
        account: Address,
        /// Positive corrections.
        corrections: Vec<Correction>,
    },
    /// A read failed; nothing is inferred for this entity.
    Skipped(SkippedEntity),
}

impl EntityPlan {
    /// Entity this plan is for.
    #[must_use]
    pub fn entity(&self) -> EntityId {
        match self {
            Self::Planned { entity, .. } => *entity,
            Self::Skipped(skipped) => skipped.entity,
        }
    }

    /// Corrections, empty when skipped.
    #[must_use]
    pub fn into_corrections(self) -> Vec<Correction> {
        match self {
            Self::Planned { corrections, .. } => corrections,
            Self::Skipped(_) => Vec::new(),
        }
    }
}

/// Dry-run result: what a run would correct.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Entities planned or skipped.
    pub entities_scanned: usize,
    /// Planned corrections.
    pub discrepancies: Vec<Correction>,
    /// Entities whose reads failed.
    pub skipped: Vec<SkippedEntity>,
}

// =============================================================================
// SUBMISSION
// =============================================================================

/// Final state of one correction in a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Delta applied.
    Applied,
    /// A re-read found the balance already at or above expected.
    AlreadySatisfied,
    /// Not applied after all attempts.
    Failed {
        /// Last error.
        reason: String,
    },
}

/// One correction's outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    /// Correction as last submitted (re-based on retries).
    pub correction: Correction,
    /// Outcome.
    pub status: ItemStatus,
    /// Submissions that included this item.
    pub attempts: u32,
}

impl ItemReport {
    /// True for [`ItemStatus::Failed`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ItemStatus::Failed { .. })
    }
}

/// Batch-level outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Every item applied or already satisfied.
    Applied,
    /// Some items failed.
    PartiallyApplied {
        /// First failure.
        reason: String,
    },
    /// Every item failed.
    Failed {
        /// First failure.
        reason: String,
    },
}

/// One batch's outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Batch position in the run.
    pub index: usize,
    /// Whole-batch submissions made.
    pub attempts: u32,
    /// Outcome.
    pub outcome: BatchOutcome,
    /// Per-item outcomes, in batch order.
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    /// Derive the outcome from item statuses.
    #[must_use]
    pub fn from_items(index: usize, attempts: u32, items: Vec<ItemReport>) -> Self {
        let failed: Vec<&ItemReport> = items.iter().filter(|i| i.is_failed()).collect();
        let first_reason = failed.first().and_then(|item| match &item.status {
            ItemStatus::Failed { reason } => Some(reason.clone()),
            _ => None,
        });
        let outcome = match first_reason {
            None => BatchOutcome::Applied,
            Some(reason) if failed.len() == items.len() => BatchOutcome::Failed { reason },
            Some(reason) => BatchOutcome::PartiallyApplied { reason },
        };
        Self {
            index,
            attempts,
            outcome,
            items,
        }
    }

    /// True unless every item succeeded.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !matches!(self.outcome, BatchOutcome::Applied)
    }
}

/// Overall status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Everything planned was applied; nothing was skipped.
    Completed,
    /// Ran to the end with failed items or skipped entities.
    CompletedWithFailures,
    /// Stopped between batches.
    Cancelled,
}

/// Structured result of a reconciliation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: Uuid,
    /// Overall status.
    pub status: RunStatus,
    /// Entities planned or skipped.
    pub entities_scanned: usize,
    /// Entities left out.
    pub skipped: Vec<SkippedEntity>,
    /// Submitted batches.
    pub batches: Vec<BatchReport>,
    /// Corrections planned but not submitted because the run was cancelled.
    pub not_submitted: Vec<Correction>,
}

impl RunReport {
    /// Empty report, status `Completed`.
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            status: RunStatus::Completed,
            entities_scanned: 0,
            skipped: Vec::new(),
            batches: Vec::new(),
            not_submitted: Vec::new(),
        }
    }

    fn items(&self) -> impl Iterator<Item = &ItemReport> {
        self.batches.iter().flat_map(|b| b.items.iter())
    }

    /// Entities with at least one applied correction.
    #[must_use]
    pub fn corrected_entities(&self) -> BTreeSet<EntityId> {
        self.items()
            .filter(|i| i.status == ItemStatus::Applied)
            .map(|i| i.correction.entity)
            .collect()
    }

    /// Corrections applied in this run.
    #[must_use]
    pub fn applied_corrections(&self) -> Vec<&Correction> {
        self.items()
            .filter(|i| i.status == ItemStatus::Applied)
            .map(|i| &i.correction)
            .collect()
    }

    /// Corrections that failed.
    #[must_use]
    pub fn failed_corrections(&self) -> Vec<&Correction> {
        self.items().filter(|i| i.is_failed()).map(|i| &i.correction).collect()
    }

    /// Batches that were not fully applied.
    #[must_use]
    pub fn failed_batches(&self) -> Vec<&BatchReport> {
        self.batches.iter().filter(|b| b.has_failures()).collect()
    }

    /// Set `status` from contents.
    pub fn finish(&mut self, cancelled: bool) {
        self.status = if cancelled {
            RunStatus::Cancelled
        } else if !self.skipped.is_empty() || !self.failed_batches().is_empty() {
            RunStatus::CompletedWithFailures
        } else {
            RunStatus::Completed
        };
    }

    /// Completed with no failures or skips.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Process exit code: 0 clean, 1 failures or skips, 2 cancelled.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Completed => 0,
            RunStatus::CompletedWithFailures => 1,
            RunStatus::Cancelled => 2,
        }
    }
}
