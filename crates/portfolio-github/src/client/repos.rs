//! Per-repository endpoints.

use crate::error::{GitHubError, GitHubResult};
use crate::http::{HTML_MEDIA_TYPE, HttpBackend};
use crate::models::{GhLanguages, GhRepository, RepoRef, rank_languages};
use crate::url::{build_languages_url, build_readme_url, build_repo_url};

use super::GitHubClient;

impl<B: HttpBackend> GitHubClient<B> {
    /// Repository metadata.
    pub(crate) async fn fetch_repository(&self, repo: &RepoRef) -> GitHubResult<GhRepository> {
        let url = build_repo_url(&self.config, repo);
        self.backend.get_json(&url).await
    }

    /// Languages, most bytes first.
    pub(crate) async fn fetch_languages(&self, repo: &RepoRef) -> GitHubResult<Vec<String>> {
        let url = build_languages_url(&self.config, repo);
        let languages: GhLanguages = self.backend.get_json(&url).await?;
        Ok(rank_languages(languages))
    }

    /// Readme rendered to HTML by GitHub.
    ///
    /// GitHub always wraps rendered readmes in markup, so a blank body means
    /// the response was cut short or came from something else.
    pub(crate) async fn fetch_readme_html(&self, repo: &RepoRef) -> GitHubResult<String> {
        let url = build_readme_url(&self.config, repo);
        let html = self.backend.get_text(&url, HTML_MEDIA_TYPE).await?;
        if html.trim().is_empty() {
            return Err(GitHubError::InvalidResponse {
                message: format!("empty readme body from {url}"),
            });
        }
        Ok(html)
    }
}
