//! Project repository trait definition.
//!
//! This port defines the interface for project persistence operations.
//! Implementations must handle all storage details internally.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewProject, Project};

/// Repository for project persistence operations.
///
/// # Design Rules
///
/// - No `sqlx` types in signatures
/// - Languages are stored comma-joined; the implementation does the flattening
/// - The update cycle only uses `list_active` and `update`
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// List all projects currently marked active, in store order.
    ///
    /// Returned records carry id, name, logo URL, project URL and the
    /// last-updated timestamp. Synced fields are left unset.
    async fn list_active(&self) -> Result<Vec<Project>, RepositoryError>;

    /// Persist the synced fields of a project, keyed by id.
    ///
    /// Writes content, languages, alt text, repository URL and timestamp.
    /// Returns `Err(RepositoryError::NotFound)` if no project has that id.
    async fn update(&self, project: &Project) -> Result<(), RepositoryError>;

    /// Register a new project.
    ///
    /// Returns `Err(RepositoryError::AlreadyExists)` if the name is taken.
    async fn insert(&self, project: &NewProject) -> Result<Project, RepositoryError>;

    /// Mark a project active or inactive.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if no project has that id.
    async fn set_active(&self, id: i64, active: bool) -> Result<(), RepositoryError>;
}
