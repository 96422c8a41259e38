//! # Address Registry Port
//!
//! A flat `module name → deployed address` mapping. Crates that need a named
//! address take a `&dyn AddressRegistry` at call time; none of them embeds one.

use crate::errors::RegistryError;
use crate::primitives::Address;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Read/write access to the name → address book.
pub trait AddressRegistry: Send + Sync {
    /// Look up the address registered under `name`.
    fn get(&self, name: &str) -> Result<Address, RegistryError>;

    /// Record `address` under `name`, replacing any previous entry.
    fn set(&self, name: &str, address: Address) -> Result<(), RegistryError>;

    /// All registered names, sorted.
    fn names(&self) -> Vec<String>;
}

/// In-memory registry for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryAddressRegistry {
    entries: RwLock<BTreeMap<String, Address>>,
}

impl InMemoryAddressRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated from `(name, address)` pairs.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Address)>,
        S: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(name, address)| (name.into(), address))
            .collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Snapshot of every entry.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, Address> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl AddressRegistry for InMemoryAddressRegistry {
    fn get(&self, name: &str) -> Result<Address, RegistryError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| RegistryError::Storage(e.to_string()))?;
        entries
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()))
    }

    fn set(&self, name: &str, address: Address) -> Result<(), RegistryError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| RegistryError::Storage(e.to_string()))?;
        entries.insert(name.to_string(), address);
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}
