//! Run report notification
//!
//! Delivery is fire-and-forget: the engine hands a [`RunReport`] to
//! [`dispatch_detached`] and returns its result without waiting. Whatever
//! happens to the delivery afterwards is only logged.

use crate::domain::{InputFile, ResultRecord, RunMetadata, Summary};
use crate::error::NotifyError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::TaskTracker;

pub mod log;
pub mod outbox;
pub mod webhook;

pub use log::LogNotifier;
pub use outbox::OutboxNotifier;
pub use webhook::{fallback_recipient, WebhookNotifier};

/// Everything a notification target receives about a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: Summary,
    pub records: Vec<ResultRecord>,
    pub input: InputFile,
    pub meta: RunMetadata,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn notify(&self, report: &RunReport) -> Result<(), NotifyError>;
}

/// Spawn a single bounded delivery attempt on `tracker` and return at once.
pub fn dispatch_detached(
    tracker: &TaskTracker,
    notifier: Arc<dyn Notifier>,
    report: RunReport,
    timeout: Duration,
) {
    tracker.spawn(async move {
        let name = notifier.name();
        match tokio::time::timeout(timeout, notifier.notify(&report)).await {
            Ok(Ok(())) => tracing::info!(notifier = name, "run report delivered"),
            Ok(Err(err)) => tracing::warn!(notifier = name, error = %err, "run report delivery failed"),
            Err(_) => tracing::warn!(
                notifier = name,
                timeout_ms = timeout.as_millis() as u64,
                "run report delivery timed out"
            ),
        }
    });
}
