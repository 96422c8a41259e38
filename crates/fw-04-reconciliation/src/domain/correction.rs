//! # Corrections
//!
//! Per-entity planning and batching. Corrections only ever increase a
//! balance: an over-credited balance cannot be told apart from one that was
//! legitimately spent, so `expected <= current` produces nothing.

use super::policy::{expected_quantity, ReconciliationPolicy};
use super::value_objects::{DeltaOp, EntityId, ResourceId, TrackId};
use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};
use std::collections::BTreeMap;

/// A planned balance increase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Entity the ledger belongs to.
    pub entity: EntityId,
    /// Entity's sub-account.
    pub account: Address,
    /// Resource.
    pub resource: ResourceId,
    /// Balance the ledger implies.
    pub expected: U256,
    /// Balance read before planning (or on the latest re-read).
    pub current: U256,
    /// `expected - current`, always positive.
    pub delta: U256,
}

impl Correction {
    /// Correction if `expected > current`.
    #[must_use]
    pub fn between(
        entity: EntityId,
        account: Address,
        resource: ResourceId,
        expected: U256,
        current: U256,
    ) -> Option<Self> {
        (expected > current).then(|| Self {
            entity,
            account,
            resource,
            expected,
            current,
            delta: expected - current,
        })
    }

    /// Re-plan against a fresh balance read. `None` once satisfied.
    #[must_use]
    pub fn rebase(&self, current: U256) -> Option<Self> {
        Self::between(self.entity, self.account, self.resource, self.expected, current)
    }

    /// Operation submitted for this correction.
    #[must_use]
    pub fn op(&self) -> DeltaOp {
        DeltaOp {
            account: self.account,
            resource: self.resource,
            amount: self.delta,
        }
    }
}

/// Corrections for one entity from its ledger and balance reads.
///
/// Rules whose track or resource is missing from the reads are skipped; the
/// engine always supplies both.
#[must_use]
pub fn plan_entity_corrections(
    entity: EntityId,
    account: Address,
    policy: &ReconciliationPolicy,
    experience_by_track: &BTreeMap<TrackId, U256>,
    balances: &BTreeMap<ResourceId, U256>,
) -> Vec<Correction> {
    policy
        .rules()
        .iter()
        .filter_map(|rule| {
            let experience = experience_by_track.get(&rule.track)?;
            let current = balances.get(&rule.resource)?;
            let expected = expected_quantity(*experience, rule.conversion_rate);
            Correction::between(entity, account, rule.resource, expected, *current)
        })
        .collect()
}

/// A bounded group of corrections submitted together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionBatch {
    /// Position in the run, from zero.
    pub index: usize,
    /// Corrections, at most the configured batch size.
    pub items: Vec<Correction>,
}

impl CorrectionBatch {
    /// Operations for the whole batch.
    #[must_use]
    pub fn ops(&self) -> Vec<DeltaOp> {
        self.items.iter().map(Correction::op).collect()
    }
}

/// Split corrections into batches of at most `max_batch_size` (minimum 1).
#[must_use]
pub fn batch_corrections<I>(corrections: I, max_batch_size: usize) -> Vec<CorrectionBatch>
where
    I: IntoIterator<Item = Correction>,
{
    let all: Vec<Correction> = corrections.into_iter().collect();
    all.chunks(max_batch_size.max(1))
        .enumerate()
        .map(|(index, items)| CorrectionBatch {
            index,
            items: items.to_vec(),
        })
        .collect()
}
