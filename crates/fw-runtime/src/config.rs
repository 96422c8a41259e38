//! # Runtime Configuration
//!
//! Loaded from TOML, then overridden from the environment, then validated.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FW_CHAIN_ID` | `chain_id` |
//! | `FW_ADDRESS_BOOK` | `address_book` |
//! | `FW_SNAPSHOT` | `snapshot` |
//! | `FW_MAX_BATCH_SIZE` | `engine.max_batch_size` |
//! | `FW_READ_CONCURRENCY` | `engine.read_concurrency` |
//! | `FW_LOG_LEVEL` | `log_level` |

use crate::errors::ConfigError;
use fw_01_binding_codec::conformance::verify_layout_at;
use fw_01_binding_codec::domain::{FooterLayout, RUNTIME_FOOTER_OFFSET};
use fw_04_reconciliation::domain::{ReconciliationPolicy, ResourceId, ResourceRule, TrackId};
use fw_04_reconciliation::service::EngineConfig;
use serde::{Deserialize, Serialize};
use shared_types::U256;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Chain the sub-accounts are bound to.
    pub chain_id: u64,
    /// Default tracing filter; `RUST_LOG` wins when set.
    pub log_level: String,
    /// JSON address book.
    pub address_book: PathBuf,
    /// JSON ledger/balance snapshot.
    pub snapshot: PathBuf,
    /// Sub-account derivation inputs.
    pub derivation: DerivationConfig,
    /// Engine bounds.
    pub engine: EngineConfig,
    /// Resource rules.
    pub rules: Vec<RuleConfig>,
    /// Environment variables applied by the last `apply_overrides`.
    #[serde(skip)]
    pub overrides: Vec<&'static str>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            log_level: "info".to_string(),
            address_book: PathBuf::from("./addresses.json"),
            snapshot: PathBuf::from("./snapshot.json"),
            derivation: DerivationConfig::default(),
            engine: EngineConfig::default(),
            rules: Vec::new(),
            overrides: Vec::new(),
        }
    }
}

/// Which address-book entries and layout derive sub-accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    /// Address-book name of the CREATE2 registry.
    pub registry: String,
    /// Address-book name of the account implementation.
    pub implementation: String,
    /// Address-book name of the owner (token) contract.
    pub owner_contract: String,
    /// Implementation version, for reports.
    pub implementation_version: u32,
    /// CREATE2 salt.
    pub salt: u64,
    /// Footer layout version the implementation reads.
    pub layout_version: u16,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            registry: "AccountRegistry".to_string(),
            implementation: "AccountImplementation".to_string(),
            owner_contract: "EntityToken".to_string(),
            implementation_version: 1,
            salt: 0,
            layout_version: FooterLayout::RUNTIME.version(),
        }
    }
}

/// One resource rule, as written in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Resource id.
    pub resource: u64,
    /// Ledger track.
    pub track: u32,
    /// Experience per unit.
    pub conversion_rate: u64,
}

impl RuntimeConfig {
    /// Load `path` (defaults when `None`), apply `FW_*` overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without overrides or validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from `lookup` (the environment in production). The
    /// applied variable names are kept in `overrides` for logging once
    /// tracing is up.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = Vec::new();
        if let Some(v) = lookup("FW_CHAIN_ID") {
            self.chain_id = parse_var("FW_CHAIN_ID", v)?;
            applied.push("FW_CHAIN_ID");
        }
        if let Some(v) = lookup("FW_ADDRESS_BOOK") {
            self.address_book = PathBuf::from(v);
            applied.push("FW_ADDRESS_BOOK");
        }
        if let Some(v) = lookup("FW_SNAPSHOT") {
            self.snapshot = PathBuf::from(v);
            applied.push("FW_SNAPSHOT");
        }
        if let Some(v) = lookup("FW_MAX_BATCH_SIZE") {
            self.engine.max_batch_size = parse_var("FW_MAX_BATCH_SIZE", v)?;
            applied.push("FW_MAX_BATCH_SIZE");
        }
        if let Some(v) = lookup("FW_READ_CONCURRENCY") {
            self.engine.read_concurrency = parse_var("FW_READ_CONCURRENCY", v)?;
            applied.push("FW_READ_CONCURRENCY");
        }
        if let Some(v) = lookup("FW_LOG_LEVEL") {
            self.log_level = v;
            applied.push("FW_LOG_LEVEL");
        }
        self.overrides = applied;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.policy()?;
        self.layout()?;
        Ok(())
    }

    /// Validated resource policy.
    pub fn policy(&self) -> Result<ReconciliationPolicy, ConfigError> {
        let rules = self
            .rules
            .iter()
            .map(|r| ResourceRule::new(ResourceId(r.resource), TrackId(r.track), U256::from(r.conversion_rate)))
            .collect();
        Ok(ReconciliationPolicy::new(rules)?)
    }

    /// Footer layout of the configured implementation. Must read deployed
    /// runtime footers correctly.
    pub fn layout(&self) -> Result<FooterLayout, ConfigError> {
        let layout = FooterLayout::runtime_version(self.derivation.layout_version)?;
        verify_layout_at(&layout, RUNTIME_FOOTER_OFFSET)?;
        Ok(layout)
    }
}

fn parse_var<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { var, value })
}
