//! Error log repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::ErrorRecord;

/// Append-only store for operational error records.
///
/// Writes are best effort: callers log a failed write and move on.
#[async_trait]
pub trait ErrorLogRepository: Send + Sync {
    /// Append one error record.
    async fn log_error(&self, record: &ErrorRecord) -> Result<(), RepositoryError>;

    /// Most recent records first, at most `limit` of them.
    async fn recent(&self, limit: u32) -> Result<Vec<ErrorRecord>, RepositoryError>;
}
