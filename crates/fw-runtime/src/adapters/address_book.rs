//! # JSON Address Book
//!
//! A flat `{ "name": "0x…" }` file. Writes go through a temporary file and a
//! rename so a crash never leaves a truncated book behind.

use shared_types::{Address, AddressRegistry, RegistryError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// File-backed [`AddressRegistry`].
#[derive(Debug)]
pub struct JsonAddressBook {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Address>>,
}

impl JsonAddressBook {
    /// Open `path`. A missing file is an empty book; it is created on the
    /// first `set`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let entries = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|e| storage(&path, e))?;
            serde_json::from_str(&text).map_err(|e| storage(&path, e))?
        } else {
            BTreeMap::new()
        };
        info!(path = %path.display(), entries = entries.len(), "address book opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Address>) -> Result<(), RegistryError> {
        let text = serde_json::to_string_pretty(entries).map_err(|e| storage(&self.path, e))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| storage(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| storage(&self.path, e))
    }
}

impl AddressRegistry for JsonAddressBook {
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
        let mut updated = entries.clone();
        updated.insert(name.to_string(), address);
        self.persist(&updated)?;
        *entries = updated;
        debug!(name, %address, "address book entry written");
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn storage(path: &Path, error: impl std::fmt::Display) -> RegistryError {
    RegistryError::Storage(format!("{}: {error}", path.display()))
}
