//! Database setup and initialization.
//!
//! Entry points call [`setup_database`] with the configured `DATABASE_URL`.
//! The schema is created with `IF NOT EXISTS` and never altered afterwards.

use anyhow::{Context, Result};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use std::path::Path;
use std::str::FromStr;

/// Connects to the database at `database_url` and ensures the schema exists.
///
/// Accepts any `sqlx` `SQLite` URL (`sqlite://data/portfolio.db`,
/// `sqlite::memory:`). The database file is created if missing, along with
/// its parent directory.
///
/// # Example
///
/// ```rust,no_run
/// use portfolio_db::setup_database;
///
/// # async fn example() -> anyhow::Result<()> {
/// let pool = setup_database("sqlite://data/portfolio.db").await?;
/// # Ok(())
/// # }
/// ```
pub async fn setup_database(database_url: &str) -> Result<SqlitePool> {
    if !database_url.starts_with("sqlite:") {
        anyhow::bail!("Invalid database URL '{database_url}': expected a sqlite: URL");
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL '{database_url}'"))?
        .create_if_missing(true);

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let pool = SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("Failed to open database '{database_url}'"))?;

    create_schema(&pool).await?;
    tracing::debug!(url = %database_url, "Database ready");

    Ok(pool)
}

/// Same as [`setup_database`] for a plain file path.
pub async fn setup_database_file(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true),
    )
    .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
///
/// Creates a fresh in-memory database with the full production schema.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates the complete database schema.
///
/// Safe to call multiple times.
pub(crate) async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            content TEXT,
            languages TEXT,
            logo_url TEXT NOT NULL,
            logo_alt_text TEXT,
            github_url TEXT,
            project_url TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Partial index for the per-cycle listing
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_projects_active ON projects(id) WHERE is_active = 1")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS error_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            message TEXT NOT NULL,
            error_type TEXT NOT NULL,
            source_url TEXT NOT NULL,
            trace TEXT NOT NULL,
            username TEXT NOT NULL,
            logged_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
