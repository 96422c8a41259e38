//! # JSON Snapshots
//!
//! A point-in-time export of the experience ledger and item balances,
//! loaded into in-memory oracles for a reconciliation run.
//!
//! ```json
//! {
//!   "experience": [{ "entity": "1", "track": 0, "experience": "1000" }],
//!   "balances":   [{ "account": "0x…", "resource": 1, "balance": "42" }]
//! }
//! ```
//!
//! Quantities accept JSON numbers, decimal strings or `0x` hex strings and
//! are written back as decimal strings.

use crate::errors::SnapshotError;
use fw_04_reconciliation::adapters::{InMemoryBalances, InMemoryLedger};
use fw_04_reconciliation::domain::{EntityId, ResourceId, TrackId};
use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Cumulative experience of one entity on one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    /// Entity id.
    #[serde(with = "quantity")]
    pub entity: U256,
    /// Track.
    pub track: u32,
    /// Cumulative experience.
    #[serde(with = "quantity")]
    pub experience: U256,
}

/// Balance of one resource held by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Holder.
    pub account: Address,
    /// Resource id.
    pub resource: u64,
    /// Balance.
    #[serde(with = "quantity")]
    pub balance: U256,
}

/// Ledger and balances at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ledger entries.
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    /// Balance entries.
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
}

impl Snapshot {
    /// Read a snapshot file.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Self = serde_json::from_str(&text).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            experience = snapshot.experience.len(),
            balances = snapshot.balances.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write the snapshot, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, text)
            .and_then(|()| std::fs::rename(&tmp, path))
            .map_err(|source| SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Ledger oracle over the experience entries.
    #[must_use]
    pub fn ledger(&self) -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        for e in &self.experience {
            ledger.set_experience(EntityId(e.entity), TrackId(e.track), e.experience);
        }
        ledger
    }

    /// Balance oracle over the balance entries.
    #[must_use]
    pub fn balances(&self) -> InMemoryBalances {
        let balances = InMemoryBalances::new();
        for b in &self.balances {
            balances.set_balance(b.account, ResourceId(b.resource), b.balance);
        }
        balances
    }

    /// Every entity with a ledger entry, ascending.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityId> {
        let ids: BTreeSet<EntityId> = self.experience.iter().map(|e| EntityId(e.entity)).collect();
        ids.into_iter().collect()
    }

    /// Same ledger, balances replaced by the current contents of `balances`.
    #[must_use]
    pub fn with_balances(mut self, balances: &InMemoryBalances) -> Self {
        self.balances = balances
            .entries()
            .into_iter()
            .map(|(account, resource, balance)| BalanceEntry {
                account,
                resource: resource.0,
                balance,
            })
            .collect();
        self
    }
}

mod quantity {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use shared_types::U256;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(U256::from(n)),
            Raw::Text(text) => parse(text.trim()).map_err(D::Error::custom),
        }
    }

    fn parse(text: &str) -> Result<U256, String> {
        match text.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("invalid hex quantity {text:?}: {e}")),
            None => U256::from_dec_str(text).map_err(|e| format!("invalid quantity {text:?}: {e:?}")),
        }
    }
}
