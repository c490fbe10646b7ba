//! Project domain types.
//!
//! A `Project` is one portfolio entry tracked by the updater. Records are read
//! fresh from the store at the start of every cycle and written back after a
//! refresh; nothing is retained between cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator used when languages are flattened for storage.
pub const LANGUAGE_SEPARATOR: char = ',';

/// A portfolio project as stored by the repository store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Store-assigned identifier. Never changes once assigned.
    pub id: i64,
    /// Repository name on the hosting platform, used as the lookup key.
    pub name: String,
    /// Rendered readme HTML. `None` until the first sync.
    pub content: Option<String>,
    /// Languages ordered by the host's ranking. Empty until the first sync.
    pub languages: Vec<String>,
    /// Logo image URL.
    pub logo_url: String,
    /// Logo alt text, always `"<name> logo"` after a sync.
    pub logo_alt_text: Option<String>,
    /// Canonical repository URL on the hosting platform.
    pub github_url: Option<String>,
    /// Project page URL, if the project has one.
    pub project_url: Option<String>,
    /// Local time of the last successful import. `None` means never imported.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a record the way the store returns it from the active listing:
    /// only identity, logo, project URL and timestamp are populated.
    pub fn listed(
        id: i64,
        name: impl Into<String>,
        logo_url: impl Into<String>,
        project_url: Option<String>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            content: None,
            languages: Vec::new(),
            logo_url: logo_url.into(),
            logo_alt_text: None,
            github_url: None,
            project_url,
            updated_at,
        }
    }

    /// Alt text for a project's logo.
    pub fn alt_text_for(name: &str) -> String {
        format!("{name} logo")
    }

    /// Languages flattened into the comma-joined storage form.
    pub fn languages_csv(&self) -> String {
        self.languages.join(&LANGUAGE_SEPARATOR.to_string())
    }

    /// Parse the comma-joined storage form back into a list.
    ///
    /// Empty input yields an empty list rather than a single empty entry.
    pub fn parse_languages(csv: &str) -> Vec<String> {
        csv.split(LANGUAGE_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Whether this project has ever been imported.
    pub const fn is_imported(&self) -> bool {
        self.updated_at.is_some()
    }

    /// Apply freshly fetched remote data to this record.
    ///
    /// Languages are replaced wholesale, never merged. The timestamp is the
    /// local write time carried by the refresh, not the remote's.
    pub fn apply_refresh(&mut self, refresh: ProjectRefresh) {
        self.content = Some(refresh.content);
        self.languages = refresh.languages;
        self.github_url = Some(refresh.github_url);
        self.logo_alt_text = Some(Self::alt_text_for(&self.name));
        self.updated_at = Some(refresh.refreshed_at);
    }
}

/// Remote-derived fields gathered during one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRefresh {
    pub content: String,
    pub languages: Vec<String>,
    pub github_url: String,
    pub refreshed_at: DateTime<Utc>,
}

/// Data needed to register a new project with the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub logo_url: String,
    pub project_url: Option<String>,
    /// Whether the project is picked up by update cycles.
    pub is_active: bool,
}

impl NewProject {
    /// Create an active project with no page URL.
    pub fn new(name: impl Into<String>, logo_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logo_url: logo_url.into(),
            project_url: None,
            is_active: true,
        }
    }

    /// Set the project page URL.
    #[must_use]
    pub fn with_project_url(mut self, url: impl Into<String>) -> Self {
        self.project_url = Some(url.into());
        self
    }

    /// Set whether the project starts out active.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}
