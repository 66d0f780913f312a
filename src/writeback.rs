//! Rate-limited, batched write-back of target quantities
//!
//! Batches run strictly one after another with a pause between them; a
//! throttled batch stretches the following pause. A batch that fails only
//! fails its own identifiers, every later batch is still attempted.

use crate::catalog::{Catalog, QuantityChange};
use crate::classify::WriteItem;
use crate::domain::{
    Location, ResultRecord, Status, DEFAULT_BATCH_PAUSE_MS, DEFAULT_THROTTLE_PAUSE_MS,
};
use std::time::Duration;

pub const MSG_RATE_LIMITED: &str = "Rate limit reached - please try again later";

/// Pauses applied between successive mutation batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub standard: Duration,
    /// Used instead of `standard` right after a throttled batch.
    pub throttled: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            standard: Duration::from_millis(DEFAULT_BATCH_PAUSE_MS),
            throttled: Duration::from_millis(DEFAULT_THROTTLE_PAUSE_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BatchOutcome {
    Applied,
    Rejected(String),
    Throttled,
    Failed(String),
}

impl BatchOutcome {
    fn record(&self, item: &WriteItem) -> ResultRecord {
        let (status, message) = match self {
            BatchOutcome::Applied => (
                Status::Success,
                format!("Stock updated from {} to {}", item.current, item.target),
            ),
            BatchOutcome::Rejected(message) | BatchOutcome::Failed(message) => {
                (Status::Failed, message.clone())
            }
            BatchOutcome::Throttled => (Status::Failed, MSG_RATE_LIMITED.to_string()),
        };
        ResultRecord::new(item.variant_id.clone(), item.target, status, message)
    }

    fn pause(&self, pacing: &Pacing) -> Duration {
        match self {
            BatchOutcome::Throttled => pacing.throttled,
            _ => pacing.standard,
        }
    }
}

/// Apply `items` in batches of `batch_size`, one result per item.
pub async fn write_back(
    catalog: &dyn Catalog,
    items: &[WriteItem],
    location: &Location,
    batch_size: usize,
    pacing: Pacing,
    reason: &str,
) -> Vec<ResultRecord> {
    let batches: Vec<&[WriteItem]> = items.chunks(batch_size.max(1)).collect();
    let batch_count = batches.len();
    let mut records = Vec::with_capacity(items.len());

    for (index, batch) in batches.into_iter().enumerate() {
        let changes: Vec<QuantityChange> = batch
            .iter()
            .map(|item| QuantityChange {
                inventory_item: item.inventory_item.clone(),
                quantity: i64::from(item.target),
            })
            .collect();

        let outcome = match catalog.set_on_hand(&changes, location, reason).await {
            Ok(errors) if errors.is_empty() => BatchOutcome::Applied,
            Ok(errors) => BatchOutcome::Rejected(
                errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; "),
            ),
            Err(err) if err.is_rate_limited() => BatchOutcome::Throttled,
            Err(err) => BatchOutcome::Failed(err.to_string()),
        };

        match &outcome {
            BatchOutcome::Applied => {
                tracing::debug!(batch = index, size = batch.len(), "quantities applied")
            }
            BatchOutcome::Rejected(reason) => {
                tracing::warn!(batch = index, size = batch.len(), %reason, "batch rejected")
            }
            BatchOutcome::Throttled => {
                tracing::warn!(batch = index, size = batch.len(), "batch throttled by catalog")
            }
            BatchOutcome::Failed(reason) => {
                tracing::warn!(batch = index, size = batch.len(), %reason, "batch failed")
            }
        }

        records.extend(batch.iter().map(|item| outcome.record(item)));

        if index + 1 < batch_count {
            tokio::time::sleep(outcome.pause(&pacing)).await;
        }
    }

    records
}
