//! Operational error records written to the store's error table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag used as both source URL and username for records this service writes.
pub const SERVICE_TAG: &str = "PortfolioUpdater";

/// Trace text used when no trace is available for an error.
pub const TRACE_UNAVAILABLE: &str = "Not Available";

/// One row of the store's error log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Human-readable error message, including its source chain.
    pub message: String,
    /// Stable error category name (e.g. `NotFound`, `StoreError`).
    pub error_type: String,
    /// Where the error originated; the service tag for this process.
    pub source_url: String,
    /// Debug rendering of the error, or [`TRACE_UNAVAILABLE`].
    pub trace: String,
    /// Account the error is attributed to.
    pub username: String,
    /// When the error was recorded.
    pub logged_at: DateTime<Utc>,
}

impl ErrorRecord {
    /// Build a record attributed to this service.
    pub fn new(
        message: impl Into<String>,
        error_type: impl Into<String>,
        trace: Option<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        Self {
            message: message.into(),
            error_type: error_type.into(),
            source_url: SERVICE_TAG.to_string(),
            trace: trace.unwrap_or_else(|| TRACE_UNAVAILABLE.to_string()),
            username: SERVICE_TAG.to_string(),
            logged_at,
        }
    }

    /// Build a record from any error, flattening its source chain into the message.
    pub fn from_error(
        error: &(dyn std::error::Error + 'static),
        error_type: impl Into<String>,
        logged_at: DateTime<Utc>,
    ) -> Self {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            // Wrappers often already render their cause inline.
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(" - ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self::new(message, error_type, Some(format!("{error:?}")), logged_at)
    }
}
