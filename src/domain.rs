//! Core domain types shared across the reconciliation pipeline

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Upload size bound (10 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_LOOKUP_BATCH_SIZE: usize = 50;
/// Smaller than the lookup batch: the write mutation is more rate-sensitive.
pub const DEFAULT_WRITE_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_PAUSE_MS: u64 = 500;
pub const DEFAULT_THROTTLE_PAUSE_MS: u64 = 2_000;
pub const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_API_VERSION: &str = "2025-01";
pub const DEFAULT_ACCESS_TOKEN_ENV: &str = "SHOPIFY_ACCESS_TOKEN";

/// Audit reason attached to every on-hand quantity mutation.
pub const AUDIT_REASON: &str = "correction";

/// The only accepted header literal (compared lowercase).
pub const HEADER: &str = "variant_id";

/// Sample upload shown by `stock-sync template`.
pub const TEMPLATE_CSV: &str = "variant_id
39928617369774
39928617369774
42655464259824
47396585505115
42118288212208
42655464259824
42655464259824";

// ASCII digits only; `\d` would also accept other Unicode decimal digits.
static NUMERIC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// A numeric variant identifier, trimmed and validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    /// Parse a raw token. Returns `None` for blank or non-numeric input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if NUMERIC_ID.is_match(trimmed) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An external stock location, chosen by the caller before a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
}

impl Location {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Opaque catalog handle required to address a quantity mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InventoryItemRef(String);

impl InventoryItemRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the catalog told us about one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolutionRecord {
    pub found: bool,
    pub tracking_enabled: bool,
    pub inventory_item: Option<InventoryItemRef>,
    pub current_quantity: Option<i64>,
    pub has_inventory_level: bool,
}

impl ResolutionRecord {
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Terminal status of one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failed,
    SkippedNotTracked,
    NotFound,
    NoInventoryLevel,
    DryRun,
}

/// Summary bucket a status is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Success,
    Failed,
    Skipped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Failed => "failed",
            Status::SkippedNotTracked => "skipped_not_tracked",
            Status::NotFound => "not_found",
            Status::NoInventoryLevel => "no_inventory_level",
            Status::DryRun => "dry_run",
        }
    }

    pub fn bucket(&self) -> Bucket {
        match self {
            Status::Success | Status::DryRun => Bucket::Success,
            Status::Failed | Status::NotFound | Status::NoInventoryLevel => Bucket::Failed,
            Status::SkippedNotTracked => Bucket::Skipped,
        }
    }

    pub fn is_error(&self) -> bool {
        self.bucket() == Bucket::Failed
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the result ledger. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub variant_id: VariantId,
    pub count: u32,
    pub status: Status,
    pub message: String,
}

impl ResultRecord {
    pub fn new(variant_id: VariantId, count: u32, status: Status, message: impl Into<String>) -> Self {
        Self { variant_id, count, status, message: message.into() }
    }
}

/// Aggregate counts over a completed ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let mut summary = Summary { total: records.len(), ..Summary::default() };
        for record in records {
            match record.status.bucket() {
                Bucket::Success => summary.success += 1,
                Bucket::Failed => summary.failed += 1,
                Bucket::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// Rounded success percentage; 0 for an empty run.
    pub fn success_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.success as f64 / self.total as f64) * 100.0).round() as u32
    }

    pub fn all_succeeded(&self) -> bool {
        self.success == self.total
    }
}

/// Uploaded file as received, kept for notification attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }
}

/// Context attached to a completed run for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunMetadata {
    pub shop: String,
    pub location_name: String,
    pub dry_run: bool,
    /// Hex SHA-256 of the uploaded bytes.
    pub input_digest: String,
    pub finished_at: DateTime<Utc>,
}

/// Where completed run reports are delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    #[default]
    None,
    Log,
    Webhook,
    Outbox,
}

impl FromStr for NotifyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(NotifyKind::None),
            "log" => Ok(NotifyKind::Log),
            "webhook" => Ok(NotifyKind::Webhook),
            "outbox" => Ok(NotifyKind::Outbox),
            other => Err(format!(
                "Invalid notify kind '{other}'. Expected one of: none, log, webhook, outbox"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub kind: NotifyKind,
    pub webhook_url: Option<String>,
    pub outbox_dir: Option<PathBuf>,
    pub recipient: Option<String>,
    pub timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            kind: NotifyKind::None,
            webhook_url: None,
            outbox_dir: None,
            recipient: None,
            timeout_ms: DEFAULT_NOTIFY_TIMEOUT_MS,
        }
    }
}

/// Tool configuration, merged from file and command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shop domain, e.g. `example.myshopify.com`.
    pub shop: Option<String>,
    pub api_version: String,
    /// Environment variable holding the admin access token.
    pub access_token_env: String,
    /// Full GraphQL endpoint; overrides the one derived from `shop`.
    pub endpoint: Option<String>,
    pub request_timeout_ms: u64,
    pub max_input_bytes: usize,
    pub lookup_batch_size: usize,
    pub write_batch_size: usize,
    pub batch_pause_ms: u64,
    pub throttle_pause_ms: u64,
    pub notify: NotifyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shop: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token_env: DEFAULT_ACCESS_TOKEN_ENV.to_string(),
            endpoint: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            lookup_batch_size: DEFAULT_LOOKUP_BATCH_SIZE,
            write_batch_size: DEFAULT_WRITE_BATCH_SIZE,
            batch_pause_ms: DEFAULT_BATCH_PAUSE_MS,
            throttle_pause_ms: DEFAULT_THROTTLE_PAUSE_MS,
            notify: NotifyConfig::default(),
        }
    }
}
