//! # Value Objects
//!
//! Identifiers for entities, ledger tracks and resources, and the delta
//! operation submitted to the balance oracle.

use serde::{Deserialize, Serialize};
use shared_types::{Address, U256};
use std::fmt;
use std::str::FromStr;

/// Entity whose ledger drives its balances (an owner id).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub U256);

impl EntityId {
    /// Entity from a small integer.
    #[must_use]
    pub fn from_u64(id: u64) -> Self {
        Self(U256::from(id))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl FromStr for EntityId {
    type Err = String;

    /// Decimal, or `0x`-prefixed hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| e.to_string()),
            None => U256::from_dec_str(s).map_err(|e| format!("{e:?}")),
        };
        parsed.map(Self).map_err(|e| format!("invalid entity id {s:?}: {e}"))
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::from_u64(id)
    }
}

/// Ledger track (a skill) whose cumulative experience feeds a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track {}", self.0)
    }
}

/// Resource (item id) whose balance is reconciled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource {}", self.0)
    }
}

/// One balance increase: add `amount` of `resource` to `account`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaOp {
    /// Receiving account.
    pub account: Address,
    /// Resource.
    pub resource: ResourceId,
    /// Amount to add. Never negative by construction.
    pub amount: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_parse() {
        assert_eq!("42".parse::<EntityId>().unwrap(), EntityId::from_u64(42));
        assert_eq!("0x2a".parse::<EntityId>().unwrap(), EntityId::from_u64(42));
        assert!("forty-two".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(EntityId::from_u64(7).to_string(), "#7");
        assert_eq!(ResourceId(3).to_string(), "resource 3");
    }
}
