//! `SQLite` implementation of the `ErrorLogRepository` trait.

use async_trait::async_trait;
use sqlx::SqlitePool;

use portfolio_core::{ErrorLogRepository, ErrorRecord, RepositoryError};

use super::row_mappers::{ERROR_LOG_COLUMNS, format_timestamp, row_to_error_record};

/// Append-only error table.
pub struct SqliteErrorLogRepository {
    pool: SqlitePool,
}

impl SqliteErrorLogRepository {
    /// Create a new `SQLite` error log repository.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ErrorLogRepository for SqliteErrorLogRepository {
    async fn log_error(&self, record: &ErrorRecord) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO error_log ({ERROR_LOG_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"
        ))
        .bind(&record.message)
        .bind(&record.error_type)
        .bind(&record.source_url)
        .bind(&record.trace)
        .bind(&record.username)
        .bind(format_timestamp(&record.logged_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ErrorRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {ERROR_LOG_COLUMNS} FROM error_log ORDER BY id DESC LIMIT ?"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        rows.iter().map(row_to_error_record).collect()
    }
}
