//! Composition utilities for wiring `SQLite` repositories.
//!
//! Construction only; no domain logic lives here.

use sqlx::SqlitePool;
use std::sync::Arc;

use portfolio_core::Repos;

use crate::repositories::{SqliteErrorLogRepository, SqliteProjectRepository};

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Create a `SQLite` connection pool with the schema in place.
    ///
    /// # Arguments
    ///
    /// * `db_url` - `SQLite` connection URL (e.g. `sqlite://data/portfolio.db`)
    pub async fn create_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
        crate::setup::setup_database(db_url).await
    }

    /// Build all `SQLite` repositories from a pool.
    ///
    /// Returns the `Repos` container from `portfolio-core` with
    /// trait-object-wrapped repositories.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteProjectRepository::new(pool.clone())),
            Arc::new(SqliteErrorLogRepository::new(pool)),
        )
    }

    /// Create a project repository from a pool.
    ///
    /// The concrete type exposes maintenance queries the port does not.
    pub fn project_repository(pool: SqlitePool) -> Arc<SqliteProjectRepository> {
        Arc::new(SqliteProjectRepository::new(pool))
    }

    /// Create an error log repository from a pool.
    pub fn error_log_repository(pool: SqlitePool) -> Arc<SqliteErrorLogRepository> {
        Arc::new(SqliteErrorLogRepository::new(pool))
    }
}

/// Test database helper for integration tests.
///
/// In-memory `SQLite` with the production schema applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with full schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn repos(&self) -> Repos {
        CoreFactory::build_repos(self.pool.clone())
    }

    pub fn project_repository(&self) -> SqliteProjectRepository {
        SqliteProjectRepository::new(self.pool.clone())
    }

    pub fn error_log_repository(&self) -> SqliteErrorLogRepository {
        SqliteErrorLogRepository::new(self.pool.clone())
    }
}
