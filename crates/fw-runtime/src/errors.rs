//! # Runtime Errors

use fw_01_binding_codec::errors::{ConformanceError, LayoutError};
use fw_04_reconciliation::errors::{EngineConfigError, PolicyError};
use shared_types::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration could not be loaded or is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file unreadable.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`RuntimeConfig`](crate::config::RuntimeConfig).
    #[error("cannot parse config {path}: {source}")]
    Parse {
        /// File.
        path: PathBuf,
        /// Cause.
        #[source]
        source: toml::de::Error,
    },

    /// An `FW_*` variable has an unusable value.
    #[error("environment variable {var}={value:?} is invalid")]
    InvalidOverride {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// Unknown footer layout version.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Configured layout misreads deployed footers.
    #[error(transparent)]
    Conformance(#[from] ConformanceError),

    /// Bad resource rules.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Bad engine bounds.
    #[error(transparent)]
    Engine(#[from] EngineConfigError),
}

/// A ledger/balance snapshot could not be read or written.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File I/O failed.
    #[error("snapshot {path}: {source}")]
    Io {
        /// File.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid snapshot.
    #[error("snapshot {path} is malformed: {source}")]
    Json {
        /// File.
        path: PathBuf,
        /// Cause.
        #[source]
        source: serde_json::Error,
    },
}

/// The engine could not be assembled.
#[derive(Debug, Error)]
pub enum WiringError {
    /// A named address is missing from the address book.
    #[error("address book: {0}")]
    Registry(#[from] RegistryError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
