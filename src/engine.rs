//! Reconciliation engine entry point
//!
//! Wires the stages together: parse → aggregate → resolve → classify →
//! write back → ledger, then hands the finished run to the notifier without
//! waiting for it. Collaborators and limits are injected through
//! [`Engine::new`]; nothing here reads process state.

use crate::aggregate::aggregate;
use crate::catalog::Catalog;
use crate::classify::{classify, Classification};
use crate::domain::{
    Config, InputFile, Location, ResolutionRecord, ResultRecord, RunMetadata, Summary,
    AUDIT_REASON, DEFAULT_LOOKUP_BATCH_SIZE, DEFAULT_MAX_INPUT_BYTES, DEFAULT_NOTIFY_TIMEOUT_MS,
    DEFAULT_WRITE_BATCH_SIZE,
};
use crate::error::ReconcileError;
use crate::ledger::Ledger;
use crate::notify::{dispatch_detached, Notifier, RunReport};
use crate::parse::parse_upload;
use crate::resolve::resolve;
use crate::utils::sha256_hex;
use crate::writeback::{write_back, Pacing};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;

/// Limits and pacing for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub max_input_bytes: usize,
    pub lookup_batch_size: usize,
    pub write_batch_size: usize,
    pub pacing: Pacing,
    pub notify_timeout: Duration,
    pub audit_reason: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            lookup_batch_size: DEFAULT_LOOKUP_BATCH_SIZE,
            write_batch_size: DEFAULT_WRITE_BATCH_SIZE,
            pacing: Pacing::default(),
            notify_timeout: Duration::from_millis(DEFAULT_NOTIFY_TIMEOUT_MS),
            audit_reason: AUDIT_REASON.to_string(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_input_bytes: config.max_input_bytes,
            lookup_batch_size: config.lookup_batch_size,
            write_batch_size: config.write_batch_size,
            pacing: Pacing {
                standard: Duration::from_millis(config.batch_pause_ms),
                throttled: Duration::from_millis(config.throttle_pause_ms),
            },
            notify_timeout: Duration::from_millis(config.notify.timeout_ms),
            audit_reason: AUDIT_REASON.to_string(),
        }
    }
}

/// One upload to reconcile against one location.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub input: InputFile,
    pub location: Location,
    pub dry_run: bool,
    /// Shop identity reported to the notifier.
    pub shop: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    Disabled,
    /// Handed to a background task; delivery is not part of the result.
    Queued,
}

/// Result of a completed run. Individual failures live in `results`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub summary: Summary,
    pub results: Vec<ResultRecord>,
    pub dry_run: bool,
    pub input_digest: String,
    pub notification: NotificationState,
}

pub struct Engine {
    catalog: Arc<dyn Catalog>,
    notifier: Option<Arc<dyn Notifier>>,
    settings: EngineSettings,
    background: TaskTracker,
}

impl Engine {
    pub fn new(catalog: Arc<dyn Catalog>, settings: EngineSettings) -> Self {
        Self { catalog, notifier: None, settings, background: TaskTracker::new() }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Tracker of detached notification tasks. Hosts that are about to exit
    /// may wait on it; the engine itself never does.
    pub fn background_tasks(&self) -> TaskTracker {
        self.background.clone()
    }

    pub async fn run(&self, request: RunRequest) -> Result<RunOutcome, ReconcileError> {
        let RunRequest { input, location, dry_run, shop } = request;

        let ids = parse_upload(&input.bytes, self.settings.max_input_bytes)?;
        let target = aggregate(&ids);
        tracing::info!(
            rows = ids.len(),
            unique = target.len(),
            location = %location.name,
            dry_run,
            "starting reconciliation"
        );

        let resolutions = resolve(
            self.catalog.as_ref(),
            target.unique(),
            &location,
            self.settings.lookup_batch_size,
        )
        .await?;

        let mut ledger = Ledger::new(&target);
        let mut queue = Vec::new();
        let not_found = ResolutionRecord::not_found();
        for (id, count) in target.iter() {
            let record = resolutions.get(id).unwrap_or(&not_found);
            match classify(id, count, record, dry_run) {
                Classification::Terminal(result) => ledger.record(result)?,
                Classification::Write(item) => queue.push(item),
            }
        }

        if !queue.is_empty() {
            tracing::info!(eligible = queue.len(), "writing target quantities");
            let written = write_back(
                self.catalog.as_ref(),
                &queue,
                &location,
                self.settings.write_batch_size,
                self.settings.pacing,
                &self.settings.audit_reason,
            )
            .await;
            ledger.extend(written)?;
        }

        let results = ledger.finish()?;
        let summary = Summary::from_records(&results);
        let input_digest = sha256_hex(&input.bytes);
        tracing::info!(
            total = summary.total,
            success = summary.success,
            failed = summary.failed,
            skipped = summary.skipped,
            "reconciliation complete"
        );

        let notification = match &self.notifier {
            Some(notifier) => {
                let report = RunReport {
                    summary,
                    records: results.clone(),
                    input,
                    meta: RunMetadata {
                        shop,
                        location_name: location.name,
                        dry_run,
                        input_digest: input_digest.clone(),
                        finished_at: Utc::now(),
                    },
                };
                dispatch_detached(
                    &self.background,
                    Arc::clone(notifier),
                    report,
                    self.settings.notify_timeout,
                );
                NotificationState::Queued
            }
            None => NotificationState::Disabled,
        };

        Ok(RunOutcome { summary, results, dry_run, input_digest, notification })
    }
}
