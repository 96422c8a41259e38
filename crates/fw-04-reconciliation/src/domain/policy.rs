//! # Reconciliation Policy
//!
//! Which resources are derived from which ledger track, and at what rate.

use super::value_objects::{ResourceId, TrackId};
use crate::errors::PolicyError;
use serde::{Deserialize, Serialize};
use shared_types::U256;
use std::collections::BTreeSet;

/// `resource` balance is owed at one unit per `conversion_rate` experience
/// on `track`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRule {
    /// Reconciled resource.
    pub resource: ResourceId,
    /// Ledger track it is derived from.
    pub track: TrackId,
    /// Experience per unit of resource. Never zero.
    pub conversion_rate: U256,
}

impl ResourceRule {
    /// Create a rule.
    #[must_use]
    pub fn new(resource: ResourceId, track: TrackId, conversion_rate: U256) -> Self {
        Self {
            resource,
            track,
            conversion_rate,
        }
    }
}

/// Validated set of resource rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReconciliationPolicy {
    rules: Vec<ResourceRule>,
}

impl ReconciliationPolicy {
    /// Validate and build a policy.
    pub fn new(rules: Vec<ResourceRule>) -> Result<Self, PolicyError> {
        if rules.is_empty() {
            return Err(PolicyError::Empty);
        }
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if rule.conversion_rate.is_zero() {
                return Err(PolicyError::ZeroConversionRate {
                    resource: rule.resource,
                });
            }
            if !seen.insert(rule.resource) {
                return Err(PolicyError::DuplicateResource {
                    resource: rule.resource,
                });
            }
        }
        Ok(Self { rules })
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[ResourceRule] {
        &self.rules
    }

    /// Distinct tracks the policy reads, sorted.
    #[must_use]
    pub fn tracks(&self) -> Vec<TrackId> {
        let tracks: BTreeSet<TrackId> = self.rules.iter().map(|r| r.track).collect();
        tracks.into_iter().collect()
    }
}

/// Balance owed for `experience` at `rate`: `floor(experience / rate)`.
///
/// A zero rate owes nothing; policies never contain one.
#[must_use]
pub fn expected_quantity(experience: U256, rate: U256) -> U256 {
    if rate.is_zero() {
        return U256::zero();
    }
    experience / rate
}
