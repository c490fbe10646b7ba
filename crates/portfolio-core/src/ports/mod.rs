//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` or `reqwest` types in any signature
//! - Repository traits are minimal and CRUD-focused
//! - Collaborators are passed in explicitly, never held in statics

pub mod clock;
pub mod error_log_repository;
pub mod github;
pub mod project_repository;

use std::sync::Arc;
use thiserror::Error;

pub use clock::{Clock, SystemClock};
pub use error_log_repository::ErrorLogRepository;
pub use github::{HostPortError, HostPortResult, RemoteRepository, RepoHostPort};
pub use project_repository::ProjectRepository;

/// Container for all repository trait objects.
///
/// Lives in `portfolio-core` so that services and the runtime can accept it
/// without depending on `portfolio-db`.
///
/// # Example
///
/// ```ignore
/// // In portfolio-db factory:
/// pub fn build_repos(pool: SqlitePool) -> Repos { ... }
///
/// // In the CLI bootstrap:
/// let repos = portfolio_db::CoreFactory::build_repos(pool);
/// let settings = SyncSettings::new("octocat");
/// let cycle = UpdateCycle::new(repos.projects.clone(), host, &settings);
/// ```
#[derive(Clone)]
pub struct Repos {
    /// Project repository read and written by the update cycle.
    pub projects: Arc<dyn ProjectRepository>,
    /// Error log repository written by the failure handler.
    pub error_log: Arc<dyn ErrorLogRepository>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        error_log: Arc<dyn ErrorLogRepository>,
    ) -> Self {
        Self {
            projects,
            error_log,
        }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (connectivity, I/O, malformed rows).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A constraint was violated (e.g., NOT NULL, unique constraint).
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Errors that end an update cycle (or, when skipping, a single project).
///
/// `kind()` yields the stable category name written to the store's error table.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The remote repository for a stored project no longer exists.
    #[error("Remote repository {owner}/{name} not found")]
    NotFound {
        /// Repository owner
        owner: String,
        /// Repository name
        name: String,
    },

    /// Network, auth or rate-limit failure from the hosting API.
    #[error("Hosting API request failed: {0}")]
    TransientClient(#[source] HostPortError),

    /// Store connectivity or constraint failure.
    #[error("Store operation failed: {0}")]
    Store(#[from] RepositoryError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CycleError {
    /// Stable category name for error logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::TransientClient(_) => "TransientClientError",
            Self::Store(_) => "StoreError",
            Self::Configuration(_) => "ConfigurationError",
        }
    }
}

impl From<HostPortError> for CycleError {
    fn from(err: HostPortError) -> Self {
        match err {
            HostPortError::NotFound { owner, name } => Self::NotFound { owner, name },
            HostPortError::Configuration { message } => Self::Configuration(message),
            other => Self::TransientClient(other),
        }
    }
}
