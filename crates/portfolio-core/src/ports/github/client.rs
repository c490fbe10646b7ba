//! Repository host client port trait.

use super::error::HostPortResult;
use super::types::RemoteRepository;
use async_trait::async_trait;

/// Port trait for the source-code hosting API.
///
/// The implementation lives in `portfolio-github`. It is constructed once
/// with its credential and passed into the update cycle explicitly, so tests
/// can substitute a scripted client.
///
/// # Design
///
/// - Uses core-owned DTOs, not GitHub API types
/// - Returns `HostPortError` for all failures
/// - No retries: a failed call is reported as-is
#[async_trait]
pub trait RepoHostPort: Send + Sync {
    /// Fetch repository metadata.
    ///
    /// Fails with `HostPortError::NotFound` if the repository is gone.
    async fn get_repository(&self, owner: &str, name: &str) -> HostPortResult<RemoteRepository>;

    /// Fetch the repository's languages, most prominent first.
    async fn get_languages(&self, owner: &str, name: &str) -> HostPortResult<Vec<String>>;

    /// Fetch the repository readme rendered as HTML.
    async fn get_readme_html(&self, owner: &str, name: &str) -> HostPortResult<String>;
}
