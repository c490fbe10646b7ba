//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together:
//! - Store pool and repositories (via portfolio-db)
//! - GitHub client (via portfolio-github)
//! - Update cycle, failure reporter and scheduler (via portfolio-core and
//!   portfolio-runtime)
//!
//! Command handlers receive a composed context and never open connections
//! themselves.

use std::sync::Arc;

use anyhow::{Context, Result};
use portfolio_core::{
    ErrorLogRepository, ProjectRepository, RepoHostPort, SyncSettings, UpdateCycle,
};
use portfolio_db::{CoreFactory, SqliteErrorLogRepository, SqliteProjectRepository, setup_database};
use portfolio_github::DefaultGitHubClient;
use portfolio_runtime::{CycleScheduler, FailureReporter};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::CliError;

/// Store access for commands that only touch the database.
#[derive(Clone)]
pub struct StoreContext {
    pub projects: Arc<SqliteProjectRepository>,
    pub error_log: Arc<SqliteErrorLogRepository>,
}

/// Open the store, creating the schema if needed.
pub async fn open_store(database_url: &str) -> Result<StoreContext> {
    let pool = setup_database(database_url)
        .await
        .map_err(|e| CliError::Database(format!("{e:#}")))?;
    debug!(database_url, "Store ready");

    Ok(StoreContext {
        projects: CoreFactory::project_repository(pool.clone()),
        error_log: CoreFactory::error_log_repository(pool),
    })
}

/// Fully composed context for commands that run update cycles.
pub struct CliContext {
    pub store: StoreContext,
    pub host: Arc<dyn RepoHostPort>,
    pub settings: SyncSettings,
}

impl CliContext {
    /// Build a scheduler over this context's store and host.
    pub fn scheduler(&self) -> CycleScheduler {
        let projects: Arc<dyn ProjectRepository> = self.store.projects.clone();
        let error_log: Arc<dyn ErrorLogRepository> = self.store.error_log.clone();

        let cycle = UpdateCycle::new(projects, Arc::clone(&self.host), &self.settings);
        let reporter = FailureReporter::new(error_log);
        CycleScheduler::new(Arc::new(cycle), Arc::new(reporter), self.settings.interval)
    }
}

/// Bootstrap the CLI application from validated configuration.
pub async fn bootstrap(config: &AppConfig) -> Result<CliContext> {
    let store = open_store(&config.database_url).await?;

    let client = DefaultGitHubClient::new(&config.github_client_config())
        .map_err(|e| CliError::Config(e.to_string()))
        .context("Failed to build GitHub client")?;

    Ok(bootstrap_with(store, Arc::new(client), config.sync.clone()))
}

/// Compose a context from ready-made parts (for testing).
pub fn bootstrap_with(
    store: StoreContext,
    host: Arc<dyn RepoHostPort>,
    settings: SyncSettings,
) -> CliContext {
    CliContext {
        store,
        host,
        settings,
    }
}
