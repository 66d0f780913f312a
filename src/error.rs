//! Error types for the reconciliation pipeline

use crate::domain::VariantId;
use thiserror::Error;

/// Input rejected before any catalog call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("File too large ({size} bytes, max {} MB)", .limit / 1024 / 1024)]
    OversizeInput { size: usize, limit: usize },

    #[error("CSV file is empty")]
    EmptyInput,

    #[error("Invalid header. Expected: \"variant_id\", received: \"{found}\"")]
    InvalidHeader { found: String },

    #[error("No valid variant_id found in CSV")]
    NoValidIdentifiers,
}

/// Failure talking to the inventory catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("catalog request failed: {0}")]
    Transport(String),

    #[error("catalog query failed: {}", .0.join("; "))]
    Graphql(Vec<String>),

    #[error("unexpected catalog response: {0}")]
    Decode(String),
}

const RATE_LIMIT_MARKERS: &[&str] = &["429", "rate limit", "throttled"];

impl CatalogError {
    /// True for HTTP 429, or a transport or API failure whose message carries
    /// a rate-limit marker. Decode errors never count.
    pub fn is_rate_limited(&self) -> bool {
        let text = match self {
            CatalogError::Http { status: 429, .. } => return true,
            CatalogError::Http { message, .. } | CatalogError::Transport(message) => {
                message.to_ascii_lowercase()
            }
            CatalogError::Graphql(messages) => messages.join("; ").to_ascii_lowercase(),
            CatalogError::Decode(_) => return false,
        };
        RATE_LIMIT_MARKERS.iter().any(|marker| text.contains(marker))
    }
}

/// Ledger bookkeeping violation. Cannot happen while stages honor their contracts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("duplicate result for variant {0}")]
    Duplicate(VariantId),

    #[error("no result recorded for {count} variant(s), first missing: {first}")]
    Missing { count: usize, first: VariantId },

    #[error("result recorded for variant {0} that is not part of this run")]
    Unknown(VariantId),
}

/// Notification delivery failure. Logged by the dispatcher, never propagated.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification endpoint returned HTTP {0}")]
    Http(u16),

    #[error("notification request failed: {0}")]
    Transport(String),

    #[error("failed writing notification outbox: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal run failure: no ledger is produced.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Catalog unavailable (lookup batch {batch}): {source}")]
    CatalogUnavailable {
        batch: usize,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_429_is_rate_limited() {
        let err = CatalogError::Http { status: 429, message: "Too Many Requests".to_string() };
        assert!(err.is_rate_limited());
    }

    #[test]
    fn rate_limit_marker_in_message_is_detected() {
        assert!(CatalogError::Transport("Rate limit exceeded".to_string()).is_rate_limited());
        assert!(CatalogError::Graphql(vec!["Throttled".to_string()]).is_rate_limited());
        assert!(CatalogError::Transport("upstream said 429".to_string()).is_rate_limited());
    }

    #[test]
    fn other_failures_are_not_rate_limited() {
        let err = CatalogError::Http { status: 502, message: "Bad Gateway".to_string() };
        assert!(!err.is_rate_limited());
        assert!(!CatalogError::Transport("connection reset".to_string()).is_rate_limited());
    }

    #[test]
    fn decode_errors_are_never_rate_limited() {
        let err = CatalogError::Decode("expected value at line 1 column 429".to_string());
        assert!(!err.is_rate_limited());
        let err = CatalogError::Decode("unknown variant `throttled`".to_string());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn input_error_messages_are_user_facing() {
        let err = InputError::InvalidHeader { found: "sku_id".to_string() };
        assert_eq!(err.to_string(), "Invalid header. Expected: \"variant_id\", received: \"sku_id\"");
        let err = InputError::OversizeInput { size: 11 * 1024 * 1024, limit: 10 * 1024 * 1024 };
        assert!(err.to_string().contains("max 10 MB"));
    }
}
