//! In-memory fakes for the core ports.
//!
//! Enabled for this crate's tests and, through the `test-utils` feature, for
//! tests in downstream crates. Fakes record every call so tests can assert on
//! what the update cycle did and did not touch.

#![allow(clippy::missing_const_for_fn)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::{ErrorRecord, NewProject, Project};
use crate::ports::{
    Clock, ErrorLogRepository, HostPortError, HostPortResult, ProjectRepository, RemoteRepository,
    RepoHostPort, RepositoryError,
};

// ============================================================================
// Project repository
// ============================================================================

#[derive(Debug, Clone)]
struct StoredProject {
    project: Project,
    active: bool,
}

/// Project repository backed by a vector, preserving insertion order.
#[derive(Default)]
pub struct InMemoryProjectRepository {
    rows: Mutex<Vec<StoredProject>>,
    next_id: Mutex<i64>,
    failing_updates: Mutex<HashSet<i64>>,
    fail_listing: Mutex<bool>,
    update_log: Mutex<Vec<i64>>,
}

impl InMemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with active projects as the store would list them.
    pub fn with_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let repo = Self::new();
        {
            let mut rows = repo.rows.lock().unwrap();
            let mut next_id = repo.next_id.lock().unwrap();
            for project in projects {
                *next_id = (*next_id).max(project.id);
                rows.push(StoredProject {
                    project,
                    active: true,
                });
            }
        }
        repo
    }

    /// Make `update` fail with a storage error for this id.
    pub fn fail_updates_for(&self, id: i64) {
        self.failing_updates.lock().unwrap().insert(id);
    }

    /// Make `list_active` fail with a storage error.
    pub fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    /// Snapshot of a stored project, active or not.
    pub fn get(&self, id: i64) -> Option<Project> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.project.id == id)
            .map(|r| r.project.clone())
    }

    /// Ids passed to successful `update` calls, in call order.
    pub fn updated_ids(&self) -> Vec<i64> {
        self.update_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn list_active(&self) -> Result<Vec<Project>, RepositoryError> {
        if *self.fail_listing.lock().unwrap() {
            return Err(RepositoryError::Storage("listing unavailable".to_string()));
        }
        // Mirror the store: synced fields are not part of the listing.
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.active)
            .map(|r| {
                let p = &r.project;
                Project::listed(
                    p.id,
                    p.name.clone(),
                    p.logo_url.clone(),
                    p.project_url.clone(),
                    p.updated_at,
                )
            })
            .collect())
    }

    async fn update(&self, project: &Project) -> Result<(), RepositoryError> {
        if self.failing_updates.lock().unwrap().contains(&project.id) {
            return Err(RepositoryError::Storage(format!(
                "write rejected for project {}",
                project.id
            )));
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.project.id == project.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Project with ID {}", project.id)))?;

        row.project.content.clone_from(&project.content);
        row.project.languages.clone_from(&project.languages);
        row.project.logo_alt_text.clone_from(&project.logo_alt_text);
        row.project.github_url.clone_from(&project.github_url);
        row.project.updated_at = project.updated_at;
        drop(rows);

        self.update_log.lock().unwrap().push(project.id);
        Ok(())
    }

    async fn insert(&self, project: &NewProject) -> Result<Project, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.project.name == project.name) {
            return Err(RepositoryError::AlreadyExists(project.name.clone()));
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let created = Project::listed(
            *next_id,
            project.name.clone(),
            project.logo_url.clone(),
            project.project_url.clone(),
            None,
        );
        rows.push(StoredProject {
            project: created.clone(),
            active: project.is_active,
        });
        Ok(created)
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.project.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Project with ID {id}")))?;
        row.active = active;
        Ok(())
    }
}

// ============================================================================
// Error log
// ============================================================================

/// Error log that keeps records in memory.
#[derive(Default)]
pub struct InMemoryErrorLog {
    records: Mutex<Vec<ErrorRecord>>,
    fail_writes: Mutex<bool>,
}

impl InMemoryErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `log_error` call fail.
    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    pub fn records(&self) -> Vec<ErrorRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ErrorLogRepository for InMemoryErrorLog {
    async fn log_error(&self, record: &ErrorRecord) -> Result<(), RepositoryError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(RepositoryError::Storage("error log unavailable".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ErrorRecord>, RepositoryError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Repository host
// ============================================================================

/// Which host operation a call was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCall {
    Repository,
    Languages,
    Readme,
}

#[derive(Debug, Clone)]
struct ScriptedRepo {
    remote: RemoteRepository,
    languages: Vec<String>,
    readme: String,
}

/// How a scripted failure should present itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    NotFound,
    Network,
    RateLimited,
}

/// Host client answering from a script and recording every call.
///
/// Unknown repositories answer `NotFound`, like the real host.
#[derive(Default)]
pub struct ScriptedHost {
    repos: Mutex<HashMap<String, ScriptedRepo>>,
    failures: Mutex<HashMap<(String, HostCall), ScriptedFailure>>,
    calls: Mutex<Vec<(HostCall, String)>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a repository's answers.
    #[must_use]
    pub fn with_repo(
        self,
        name: &str,
        last_modified: DateTime<Utc>,
        html_url: &str,
        languages: &[&str],
        readme: &str,
    ) -> Self {
        self.set_repo(name, last_modified, html_url, languages, readme);
        self
    }

    /// Replace a repository's answers.
    pub fn set_repo(
        &self,
        name: &str,
        last_modified: DateTime<Utc>,
        html_url: &str,
        languages: &[&str],
        readme: &str,
    ) {
        self.repos.lock().unwrap().insert(
            name.to_string(),
            ScriptedRepo {
                remote: RemoteRepository {
                    last_modified,
                    html_url: html_url.to_string(),
                },
                languages: languages.iter().map(|s| (*s).to_string()).collect(),
                readme: readme.to_string(),
            },
        );
    }

    /// Make one operation fail for one repository.
    #[must_use]
    pub fn failing(self, name: &str, call: HostCall, failure: ScriptedFailure) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((name.to_string(), call), failure);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<(HostCall, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls of one kind made for one repository.
    pub fn call_count(&self, call: HostCall, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, n)| *c == call && n == name)
            .count()
    }

    fn answer(&self, call: HostCall, owner: &str, name: &str) -> HostPortResult<ScriptedRepo> {
        self.calls.lock().unwrap().push((call, name.to_string()));

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get(&(name.to_string(), call))
            .copied();
        match failure {
            Some(ScriptedFailure::NotFound) => {
                return Err(HostPortError::NotFound {
                    owner: owner.to_string(),
                    name: name.to_string(),
                });
            }
            Some(ScriptedFailure::Network) => {
                return Err(HostPortError::Network {
                    message: "connection reset by peer".to_string(),
                });
            }
            Some(ScriptedFailure::RateLimited) => return Err(HostPortError::RateLimited),
            None => {}
        }

        self.repos
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| HostPortError::NotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }
}

#[async_trait]
impl RepoHostPort for ScriptedHost {
    async fn get_repository(&self, owner: &str, name: &str) -> HostPortResult<RemoteRepository> {
        Ok(self.answer(HostCall::Repository, owner, name)?.remote)
    }

    async fn get_languages(&self, owner: &str, name: &str) -> HostPortResult<Vec<String>> {
        Ok(self.answer(HostCall::Languages, owner, name)?.languages)
    }

    async fn get_readme_html(&self, owner: &str, name: &str) -> HostPortResult<String> {
        Ok(self.answer(HostCall::Readme, owner, name)?.readme)
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
