//! # Reconciliation Service
//!
//! Plans corrections from the ledger and submits them in bounded batches.
//!
//! ## Flow
//!
//! ```text
//! entities ─► plan_entity (resolve, read ledger, read balances) ── buffered(read_concurrency)
//!                                   │ input order
//!                                   ▼
//!                     pending corrections ─► batch of max_batch_size
//!                                   │ cancellation checked here
//!                                   ▼
//!          apply_delta_batch ─(fail)─► backoff, re-read, re-base, resubmit
//!                                   │ still failing
//!                                   ▼
//!                     isolate: re-read + apply_delta per item
//! ```
//!
//! ## Guarantees
//!
//! - Reads run concurrently; writes are strictly sequential.
//! - No retry ever resubmits a delta computed from a stale read.
//! - A failed batch never stops the run; it is recorded and the next batch
//!   is submitted.

use crate::domain::{
    backoff_delay_ms, plan_entity_corrections, BatchReport, Correction, CorrectionBatch, DeltaOp,
    EntityId, EntityPlan, ItemReport, ItemStatus, ReconciliationPolicy, RunReport, ScanReport,
    SkipReason, SkippedEntity,
};
use crate::errors::{EngineConfigError, MutationError};
use crate::ports::{AccountResolver, BalanceOracle, LedgerOracle};
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{debug, field, info, instrument, warn, Span};
use uuid::Uuid;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum corrections per submitted batch.
    pub max_batch_size: usize,
    /// Entities planned concurrently.
    pub read_concurrency: usize,
    /// Submissions per batch (and per isolated item) before giving up.
    pub max_submit_attempts: u32,
    /// First retry delay.
    pub initial_backoff_ms: u64,
    /// Retry delay cap.
    pub max_backoff_ms: u64,
    /// Timeout for a single submission.
    pub submit_timeout_ms: u64,
    /// Pause between consecutive batches.
    pub batch_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            read_concurrency: 8,
            max_submit_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            submit_timeout_ms: 30_000,
            batch_delay_ms: 0,
        }
    }
}

impl EngineConfig {
    /// Check bounds.
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        if self.max_batch_size == 0 {
            return Err(EngineConfigError::Zero {
                field: "max_batch_size",
            });
        }
        if self.read_concurrency == 0 {
            return Err(EngineConfigError::Zero {
                field: "read_concurrency",
            });
        }
        if self.max_submit_attempts == 0 {
            return Err(EngineConfigError::Zero {
                field: "max_submit_attempts",
            });
        }
        if self.submit_timeout_ms == 0 {
            return Err(EngineConfigError::Zero {
                field: "submit_timeout_ms",
            });
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(EngineConfigError::BackoffRange {
                initial: self.initial_backoff_ms,
                max: self.max_backoff_ms,
            });
        }
        Ok(())
    }
}

/// Engine statistics across runs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Runs completed or cancelled.
    pub runs: u64,
    /// Dry-run scans.
    pub scans: u64,
    /// Corrections applied.
    pub corrections_applied: u64,
    /// Corrections failed.
    pub corrections_failed: u64,
    /// Entities skipped.
    pub entities_skipped: u64,
    /// Batches not fully applied.
    pub batches_failed: u64,
}

// =============================================================================
// ENGINE
// =============================================================================

/// A correction in flight, with its position in the batch.
struct Pending {
    position: usize,
    correction: Correction,
    attempts: u32,
}

impl Pending {
    fn finish(self, status: ItemStatus) -> (usize, ItemReport) {
        (
            self.position,
            ItemReport {
                correction: self.correction,
                status,
                attempts: self.attempts,
            },
        )
    }
}

/// Ledger-driven balance reconciliation.
pub struct ReconciliationEngine<L, B, R> {
    /// Authoritative ledger.
    ledger: Arc<L>,
    /// Derived balances.
    balances: Arc<B>,
    /// Entity → sub-account.
    resolver: Arc<R>,
    /// Resource rules.
    policy: ReconciliationPolicy,
    /// Configuration.
    config: EngineConfig,
    /// Statistics.
    stats: Arc<RwLock<EngineStats>>,
}

impl<L, B, R> ReconciliationEngine<L, B, R>
where
    L: LedgerOracle,
    B: BalanceOracle,
    R: AccountResolver,
{
    /// Create an engine. Fails on an invalid configuration.
    pub fn new(
        ledger: Arc<L>,
        balances: Arc<B>,
        resolver: Arc<R>,
        policy: ReconciliationPolicy,
        config: EngineConfig,
    ) -> Result<Self, EngineConfigError> {
        config.validate()?;
        Ok(Self {
            ledger,
            balances,
            resolver,
            policy,
            config,
            stats: Arc::new(RwLock::new(EngineStats::default())),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Policy in use.
    pub fn policy(&self) -> &ReconciliationPolicy {
        &self.policy
    }

    /// Current statistics.
    pub async fn stats(&self) -> EngineStats {
        self.stats.read().await.clone()
    }

    // -------------------------------------------------------------------------
    // Planning
    // -------------------------------------------------------------------------

    async fn plan_entity(&self, entity: EntityId) -> EntityPlan {
        let skip = |reason: SkipReason| EntityPlan::Skipped(SkippedEntity { entity, reason });

        let account = match self.resolver.resolve(entity).await {
            Ok(account) => account,
            Err(e) => return skip(e.into()),
        };

        let mut experience = BTreeMap::new();
        for track in self.policy.tracks() {
            match self.ledger.cumulative_experience(entity, track).await {
                Ok(xp) => {
                    experience.insert(track, xp);
                }
                Err(e) => return skip(SkipReason::ledger(track, &e)),
            }
        }

        let mut balances = BTreeMap::new();
        for rule in self.policy.rules() {
            match self.balances.get_balance(account, rule.resource).await {
                Ok(balance) => {
                    balances.insert(rule.resource, balance);
                }
                Err(e) => return skip(SkipReason::balance(rule.resource, &e)),
            }
        }

        let corrections =
            plan_entity_corrections(entity, account, &self.policy, &experience, &balances);
        debug!(%entity, %account, corrections = corrections.len(), "entity planned");
        EntityPlan::Planned {
            entity,
            account,
            corrections,
        }
    }

    /// Per-entity plans, in input order. Repeated entities are planned once,
    /// at their first occurrence. Reads for up to `read_concurrency` entities
    /// are in flight at once. Lazy: nothing is read until polled.
    pub fn plan_corrections(&self, entities: Vec<EntityId>) -> impl Stream<Item = EntityPlan> + '_ {
        let mut seen = HashSet::with_capacity(entities.len());
        let entities: Vec<EntityId> = entities.into_iter().filter(|e| seen.insert(*e)).collect();
        stream::iter(entities)
            .map(move |entity| self.plan_entity(entity))
            .buffered(self.config.read_concurrency)
    }

    /// Corrections of every planned entity, grouped into batches. Skipped
    /// entities contribute nothing.
    pub fn plan_batches(&self, entities: Vec<EntityId>) -> impl Stream<Item = CorrectionBatch> + '_ {
        self.plan_corrections(entities)
            .flat_map(|plan| stream::iter(plan.into_corrections()))
            .chunks(self.config.max_batch_size)
            .enumerate()
            .map(|(index, items)| CorrectionBatch { index, items })
    }

    /// Plan without submitting anything.
    pub async fn scan(&self, entities: impl IntoIterator<Item = EntityId>) -> ScanReport {
        let entities: Vec<EntityId> = entities.into_iter().collect();
        let plans: Vec<EntityPlan> = self.plan_corrections(entities).collect().await;

        let mut report = ScanReport {
            entities_scanned: plans.len(),
            ..ScanReport::default()
        };
        for plan in plans {
            match plan {
                EntityPlan::Planned { corrections, .. } => report.discrepancies.extend(corrections),
                EntityPlan::Skipped(skipped) => report.skipped.push(skipped),
            }
        }

        self.stats.write().await.scans += 1;
        info!(
            entities = report.entities_scanned,
            discrepancies = report.discrepancies.len(),
            skipped = report.skipped.len(),
            "scan complete"
        );
        report
    }

    // -------------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------------

    /// Plan and apply corrections for `entities`.
    ///
    /// `cancel` is checked between batches only; a batch that has started
    /// always finishes. Corrections planned but not submitted are listed in
    /// the report, and rerunning from scratch is always safe.
    #[instrument(skip_all, fields(run_id))]
    pub async fn run(
        &self,
        entities: impl IntoIterator<Item = EntityId>,
        cancel: watch::Receiver<bool>,
    ) -> RunReport {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", field::display(run_id));

        let entities: Vec<EntityId> = entities.into_iter().collect();
        info!(entities = entities.len(), "reconciliation run started");

        let mut report = RunReport::new(run_id);
        let max = self.config.max_batch_size;
        let mut plans = std::pin::pin!(self.plan_corrections(entities));
        let mut pending: Vec<Correction> = Vec::new();
        let mut next_index = 0usize;
        let mut cancelled = false;

        while let Some(plan) = plans.next().await {
            report.entities_scanned += 1;
            match plan {
                EntityPlan::Planned { corrections, .. } => pending.extend(corrections),
                EntityPlan::Skipped(skipped) => {
                    warn!(entity = %skipped.entity, reason = %skipped.reason, "entity skipped");
                    report.skipped.push(skipped);
                }
            }

            while pending.len() >= max {
                let items: Vec<Correction> = pending.drain(..max).collect();
                if !self.submit_next(&mut report, &mut next_index, items, &cancel).await {
                    cancelled = true;
                    break;
                }
            }
            if cancelled {
                break;
            }
        }

        if !cancelled && !pending.is_empty() {
            let items = std::mem::take(&mut pending);
            cancelled = !self.submit_next(&mut report, &mut next_index, items, &cancel).await;
        }
        report.not_submitted.extend(pending);
        report.finish(cancelled);

        self.record_run(&report).await;
        info!(
            status = ?report.status,
            entities = report.entities_scanned,
            batches = report.batches.len(),
            applied = report.applied_corrections().len(),
            failed = report.failed_corrections().len(),
            skipped = report.skipped.len(),
            not_submitted = report.not_submitted.len(),
            "reconciliation run finished"
        );
        report
    }

    /// Submit one batch unless cancelled. Returns `false` when cancelled.
    async fn submit_next(
        &self,
        report: &mut RunReport,
        next_index: &mut usize,
        items: Vec<Correction>,
        cancel: &watch::Receiver<bool>,
    ) -> bool {
        if *cancel.borrow() {
            info!(pending = items.len(), "run cancelled between batches");
            report.not_submitted.extend(items);
            return false;
        }
        if *next_index > 0 && self.config.batch_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
        }

        let batch = CorrectionBatch {
            index: *next_index,
            items,
        };
        *next_index += 1;
        report.batches.push(self.submit_batch(batch).await);
        true
    }

    async fn submit_batch(&self, batch: CorrectionBatch) -> BatchReport {
        let CorrectionBatch { index, items } = batch;
        let mut pending: Vec<Pending> = items
            .into_iter()
            .enumerate()
            .map(|(position, correction)| Pending {
                position,
                correction,
                attempts: 0,
            })
            .collect();
        let mut done: Vec<(usize, ItemReport)> = Vec::with_capacity(pending.len());
        let mut attempts = 0u32;

        while attempts < self.config.max_submit_attempts && !pending.is_empty() {
            if attempts > 0 {
                self.backoff(attempts).await;
                pending = self.refresh(pending, &mut done).await;
                if pending.is_empty() {
                    break;
                }
            }

            attempts += 1;
            let ops: Vec<DeltaOp> = pending.iter().map(|p| p.correction.op()).collect();
            for p in &mut pending {
                p.attempts += 1;
            }

            match self.submit(self.balances.apply_delta_batch(&ops)).await {
                Ok(()) => {
                    debug!(batch = index, items = ops.len(), attempts, "batch applied");
                    done.extend(pending.drain(..).map(|p| p.finish(ItemStatus::Applied)));
                }
                Err(e) => {
                    warn!(batch = index, attempt = attempts, error = %e, "batch submission failed");
                }
            }
        }

        if !pending.is_empty() {
            warn!(batch = index, items = pending.len(), "isolating items after batch failures");
            for p in pending {
                done.push(self.submit_item(index, p).await);
            }
        }

        done.sort_by_key(|(position, _)| *position);
        BatchReport::from_items(index, attempts, done.into_iter().map(|(_, item)| item).collect())
    }

    /// Re-read balances. Satisfied items finish; unreadable items fail rather
    /// than being resubmitted from a stale read.
    async fn refresh(&self, pending: Vec<Pending>, done: &mut Vec<(usize, ItemReport)>) -> Vec<Pending> {
        let mut remaining = Vec::with_capacity(pending.len());
        for mut p in pending {
            let c = p.correction;
            match self.balances.get_balance(c.account, c.resource).await {
                Ok(current) => match c.rebase(current) {
                    Some(rebased) => {
                        p.correction = rebased;
                        remaining.push(p);
                    }
                    None => done.push(p.finish(ItemStatus::AlreadySatisfied)),
                },
                Err(e) => done.push(p.finish(ItemStatus::Failed {
                    reason: format!("balance re-read failed: {e}"),
                })),
            }
        }
        remaining
    }

    async fn submit_item(&self, batch: usize, mut p: Pending) -> (usize, ItemReport) {
        let mut last_error: Option<MutationError> = None;

        for attempt in 1..=self.config.max_submit_attempts {
            if attempt > 1 {
                self.backoff(attempt - 1).await;
            }

            let c = p.correction;
            match self.balances.get_balance(c.account, c.resource).await {
                Err(e) => {
                    return p.finish(ItemStatus::Failed {
                        reason: format!("balance re-read failed: {e}"),
                    })
                }
                Ok(current) => match c.rebase(current) {
                    None => return p.finish(ItemStatus::AlreadySatisfied),
                    Some(rebased) => p.correction = rebased,
                },
            }

            p.attempts += 1;
            let c = p.correction;
            match self.submit(self.balances.apply_delta(c.account, c.resource, c.delta)).await {
                Ok(()) => return p.finish(ItemStatus::Applied),
                Err(e) => {
                    warn!(
                        batch,
                        entity = %c.entity,
                        resource = %c.resource,
                        attempt,
                        error = %e,
                        "item submission failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error.map_or_else(|| "not submitted".to_string(), |e| e.to_string());
        p.finish(ItemStatus::Failed { reason })
    }

    async fn submit<F>(&self, submission: F) -> Result<(), MutationError>
    where
        F: Future<Output = Result<(), MutationError>>,
    {
        let limit = Duration::from_millis(self.config.submit_timeout_ms);
        match tokio::time::timeout(limit, submission).await {
            Ok(result) => result,
            Err(_) => Err(MutationError::TimedOut {
                after_ms: self.config.submit_timeout_ms,
            }),
        }
    }

    async fn backoff(&self, consecutive_failures: u32) {
        let delay = backoff_delay_ms(
            self.config.initial_backoff_ms,
            self.config.max_backoff_ms,
            consecutive_failures,
        );
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    async fn record_run(&self, report: &RunReport) {
        let mut stats = self.stats.write().await;
        stats.runs += 1;
        stats.corrections_applied += report.applied_corrections().len() as u64;
        stats.corrections_failed += report.failed_corrections().len() as u64;
        stats.entities_skipped += report.skipped.len() as u64;
        stats.batches_failed += report.failed_batches().len() as u64;
    }
}

// =============================================================================
// TESTS
// =============================================================================
