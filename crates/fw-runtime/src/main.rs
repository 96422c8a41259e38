//! # fw-reconcile
//!
//! Reconcile item balances in a snapshot against its experience ledger.
//!
//! ```text
//! fw-reconcile --config fw.toml --scan             # report discrepancies only
//! fw-reconcile --config fw.toml --entities 1,2,17  # correct selected entities
//! ```
//!
//! Exit codes: 0 clean, 1 failures or skipped entities, 2 cancelled.

use anyhow::{Context, Result};
use clap::Parser;
use fw_04_reconciliation::domain::EntityId;
use fw_runtime::adapters::{JsonAddressBook, Snapshot};
use fw_runtime::{init_tracing, ReconcilerContainer, RuntimeConfig};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "fw-reconcile", version, about = "Ledger-driven item balance reconciliation")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Plan and print discrepancies without submitting anything.
    #[arg(long)]
    scan: bool,

    /// Entities to reconcile (default: every entity in the snapshot).
    #[arg(long, value_delimiter = ',')]
    entities: Vec<EntityId>,

    /// Leave the snapshot file untouched after a run.
    #[arg(long)]
    no_write: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RuntimeConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.log_level)?;
    info!(
        chain_id = config.chain_id,
        address_book = %config.address_book.display(),
        snapshot = %config.snapshot.display(),
        overrides = ?config.overrides,
        "configuration loaded"
    );

    let book = JsonAddressBook::open(&config.address_book)
        .with_context(|| format!("failed to open address book {}", config.address_book.display()))?;
    let snapshot = Snapshot::load(&config.snapshot).context("failed to load snapshot")?;
    let container = ReconcilerContainer::new(&config, &book, snapshot.ledger(), snapshot.balances())
        .context("failed to wire reconciler")?;

    let entities = if cli.entities.is_empty() {
        snapshot.entities()
    } else {
        cli.entities
    };

    if cli.scan {
        let report = container.engine.scan(entities).await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current batch");
            let _ = cancel_tx.send(true);
        }
    });

    let report = container.engine.run(entities, cancel_rx).await;

    if !cli.no_write {
        snapshot
            .with_balances(&container.balances)
            .save(&config.snapshot)
            .context("failed to write snapshot")?;
        info!(path = %config.snapshot.display(), "snapshot updated");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    std::process::exit(report.exit_code());
}
