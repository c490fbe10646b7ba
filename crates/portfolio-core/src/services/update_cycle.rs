//! Update cycle - one pass over every active project.
//!
//! For each project in store order: fetch remote metadata, run the staleness
//! check, and if stale fetch languages and the rendered readme and write the
//! record back. Projects are processed strictly one at a time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{Project, ProjectRefresh};
use crate::ports::{Clock, CycleError, ProjectRepository, RepoHostPort, SystemClock};
use crate::services::staleness::needs_refresh;
use crate::settings::{FailurePolicy, StalenessRule, SyncSettings};

/// What happened to a single project during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// Remote changed (or never imported); record rewritten.
    Refreshed,
    /// Remote unchanged since the last import; nothing written.
    UpToDate,
}

/// A project that failed while the cycle kept going.
#[derive(Debug)]
pub struct ProjectFailure {
    pub project_id: i64,
    pub project_name: String,
    pub error: CycleError,
}

/// Summary of a finished (or cancelled) cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Active projects listed at the start of the cycle.
    pub total: usize,
    /// Projects whose record was rewritten.
    pub refreshed: usize,
    /// Projects found up to date.
    pub up_to_date: usize,
    /// Failures recorded under [`FailurePolicy::Skip`].
    pub failures: Vec<ProjectFailure>,
    /// Whether cancellation stopped the cycle before every project was seen.
    pub cancelled: bool,
    /// Wall time spent in the cycle.
    pub elapsed: Duration,
}

impl CycleReport {
    /// Projects the cycle did not get to because it was cancelled.
    pub fn unvisited(&self) -> usize {
        self.total
            .saturating_sub(self.refreshed + self.up_to_date + self.failures.len())
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// The poll-check-update procedure.
///
/// Collaborators are injected at construction; the cycle holds no state
/// between runs, so every run re-reads the store.
pub struct UpdateCycle {
    projects: Arc<dyn ProjectRepository>,
    host: Arc<dyn RepoHostPort>,
    clock: Arc<dyn Clock>,
    owner: String,
    failure_policy: FailurePolicy,
    staleness_rule: StalenessRule,
}

impl UpdateCycle {
    /// Create a cycle using the wall clock.
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        host: Arc<dyn RepoHostPort>,
        settings: &SyncSettings,
    ) -> Self {
        Self {
            projects,
            host,
            clock: Arc::new(SystemClock),
            owner: settings.owner.clone(),
            failure_policy: settings.failure_policy,
            staleness_rule: settings.staleness_rule,
        }
    }

    /// Replace the time source used for written timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Run one cycle over all active projects.
    ///
    /// With [`FailurePolicy::Abort`] the first failure ends the cycle and is
    /// returned; projects written before it keep their new values and later
    /// projects are left untouched. With [`FailurePolicy::Skip`] failures are
    /// collected in the report instead.
    ///
    /// `cancel` is checked before each project.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let projects = self.projects.list_active().await?;

        info!(
            owner = %self.owner,
            count = projects.len(),
            policy = %self.failure_policy,
            "Starting update cycle"
        );

        let mut report = CycleReport {
            total: projects.len(),
            ..CycleReport::default()
        };

        for project in projects {
            if cancel.is_cancelled() {
                warn!(
                    remaining = report.unvisited(),
                    "Update cycle cancelled between projects"
                );
                report.cancelled = true;
                break;
            }

            let project_id = project.id;
            let project_name = project.name.clone();

            match self.sync_project(project).await {
                Ok(ProjectOutcome::Refreshed) => {
                    info!(project_id, project = %project_name, "Project refreshed");
                    report.refreshed += 1;
                }
                Ok(ProjectOutcome::UpToDate) => {
                    debug!(project_id, project = %project_name, "Project up to date");
                    report.up_to_date += 1;
                }
                Err(error) => {
                    warn!(
                        project_id,
                        project = %project_name,
                        kind = error.kind(),
                        error = %error,
                        "Project sync failed"
                    );
                    match self.failure_policy {
                        FailurePolicy::Abort => return Err(error),
                        FailurePolicy::Skip => report.failures.push(ProjectFailure {
                            project_id,
                            project_name,
                            error,
                        }),
                    }
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            refreshed = report.refreshed,
            up_to_date = report.up_to_date,
            failed = report.failures.len(),
            cancelled = report.cancelled,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "Update cycle finished"
        );
        Ok(report)
    }

    /// Check one project and refresh it if it is stale.
    pub async fn sync_project(&self, mut project: Project) -> Result<ProjectOutcome, CycleError> {
        let remote = self.host.get_repository(&self.owner, &project.name).await?;

        if !needs_refresh(project.updated_at, remote.last_modified, self.staleness_rule) {
            return Ok(ProjectOutcome::UpToDate);
        }

        let languages = self.host.get_languages(&self.owner, &project.name).await?;
        let content = self.host.get_readme_html(&self.owner, &project.name).await?;

        // Never move the import time backwards, even if the wall clock does.
        let now = self.clock.now();
        let refreshed_at = project.updated_at.map_or(now, |prev| prev.max(now));

        project.apply_refresh(ProjectRefresh {
            content,
            languages,
            github_url: remote.html_url,
            refreshed_at,
        });

        self.projects.update(&project).await?;
        Ok(ProjectOutcome::Refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FixedClock, HostCall, InMemoryProjectRepository, ScriptedFailure, ScriptedHost,
    };
    use chrono::{DateTime, TimeZone, Utc};

    const OWNER: &str = "u";

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn write_time() -> DateTime<Utc> {
        ts("2024-03-01T12:00:00Z")
    }

    fn build(
        repo: &Arc<InMemoryProjectRepository>,
        host: &Arc<ScriptedHost>,
        clock: &Arc<FixedClock>,
        policy: FailurePolicy,
    ) -> UpdateCycle {
        let settings = SyncSettings::new(OWNER).with_failure_policy(policy);
        UpdateCycle::new(repo.clone(), host.clone(), &settings).with_clock(clock.clone())
    }

    fn three_projects() -> Vec<Project> {
        vec![
            Project::listed(1, "alpha", "a.png", None, None),
            Project::listed(2, "beta", "b.png", None, None),
            Project::listed(3, "gamma", "c.png", None, None),
        ]
    }

    fn host_for(names: &[&str]) -> ScriptedHost {
        names.iter().fold(ScriptedHost::new(), |host, name| {
            host.with_repo(
                name,
                ts("2024-01-01T00:00:00Z"),
                &format!("https://github.com/u/{name}"),
                &["Rust"],
                &format!("<p>{name}</p>"),
            )
        })
    }

    #[tokio::test]
    async fn test_end_to_end_demo_project() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects([Project::listed(
            1,
            "demo",
            "https://img/demo.png",
            None,
            None,
        )]));
        let host = Arc::new(ScriptedHost::new().with_repo(
            "demo",
            ts("2024-01-01T00:00:00Z"),
            "https://github.com/u/demo",
            &["Go", "Shell"],
            "<h1>Demo</h1>",
        ));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let report = cycle.run(&CancellationToken::new()).await.unwrap();
        assert_eq!(report.refreshed, 1);
        assert!(report.is_clean());

        let stored = repo.get(1).unwrap();
        assert_eq!(stored.content.as_deref(), Some("<h1>Demo</h1>"));
        assert_eq!(stored.languages_csv(), "Go,Shell");
        assert_eq!(stored.logo_alt_text.as_deref(), Some("demo logo"));
        assert_eq!(
            stored.github_url.as_deref(),
            Some("https://github.com/u/demo")
        );
        assert_eq!(stored.updated_at, Some(write_time()));
    }

    #[tokio::test]
    async fn test_never_imported_projects_are_always_refreshed() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects(three_projects()));
        // Remote timestamps far in the past still refresh a never-imported project.
        let host = Arc::new(ScriptedHost::new()
            .with_repo("alpha", Utc.timestamp_opt(0, 0).unwrap(), "https://github.com/u/alpha", &[], "")
            .with_repo("beta", Utc.timestamp_opt(0, 0).unwrap(), "https://github.com/u/beta", &[], "")
            .with_repo("gamma", Utc.timestamp_opt(0, 0).unwrap(), "https://github.com/u/gamma", &[], ""));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let report = cycle.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.refreshed, 3);
        assert_eq!(repo.updated_ids(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_remote_older_than_local_skips_details_and_write() {
        let imported = ts("2024-02-01T00:00:00Z");
        let repo = Arc::new(InMemoryProjectRepository::with_projects([Project::listed(
            1,
            "demo",
            "",
            None,
            Some(imported),
        )]));
        let host = Arc::new(ScriptedHost::new().with_repo(
            "demo",
            ts("2024-01-15T00:00:00Z"),
            "https://github.com/u/demo",
            &["Go"],
            "<h1>Demo</h1>",
        ));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let report = cycle.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.up_to_date, 1);
        assert_eq!(host.call_count(HostCall::Repository, "demo"), 1);
        assert_eq!(host.call_count(HostCall::Languages, "demo"), 0);
        assert_eq!(host.call_count(HostCall::Readme, "demo"), 0);
        assert!(repo.updated_ids().is_empty());
        assert_eq!(repo.get(1).unwrap().updated_at, Some(imported));
    }

    #[tokio::test]
    async fn test_languages_are_replaced_not_merged() {
        let mut seeded = Project::listed(1, "demo", "", None, None);
        seeded.languages = vec!["Java".into(), "Kotlin".into()];
        let repo = Arc::new(InMemoryProjectRepository::with_projects([seeded]));
        let host = Arc::new(ScriptedHost::new().with_repo(
            "demo",
            ts("2024-01-01T00:00:00Z"),
            "https://github.com/u/demo",
            &["Rust", "Shell"],
            "",
        ));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        cycle.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(repo.get(1).unwrap().languages_csv(), "Rust,Shell");
    }

    #[tokio::test]
    async fn test_timestamp_is_local_write_time_not_remote() {
        let remote_time = ts("2023-06-01T08:30:00Z");
        let repo = Arc::new(InMemoryProjectRepository::with_projects([Project::listed(
            1, "demo", "", None, None,
        )]));
        let host = Arc::new(ScriptedHost::new().with_repo(
            "demo",
            remote_time,
            "https://github.com/u/demo",
            &[],
            "",
        ));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        cycle.run(&CancellationToken::new()).await.unwrap();

        let stored = repo.get(1).unwrap().updated_at.unwrap();
        assert_eq!(stored, write_time());
        assert_ne!(stored, remote_time);
    }

    #[tokio::test]
    async fn test_timestamp_never_moves_backwards() {
        let imported = ts("2024-05-01T00:00:00Z");
        let repo = Arc::new(InMemoryProjectRepository::with_projects([Project::listed(
            1,
            "demo",
            "",
            None,
            Some(imported),
        )]));
        let host = Arc::new(ScriptedHost::new().with_repo(
            "demo",
            ts("2024-06-01T00:00:00Z"),
            "https://github.com/u/demo",
            &[],
            "",
        ));
        // Wall clock behind the previous import time.
        let clock = Arc::new(FixedClock::at(ts("2024-04-01T00:00:00Z")));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        cycle.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(repo.get(1).unwrap().updated_at, Some(imported));
    }

    #[tokio::test]
    async fn test_failure_on_middle_project_aborts_cycle() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects(three_projects()));
        let host = Arc::new(
            host_for(&["alpha", "beta", "gamma"]).failing(
                "beta",
                HostCall::Repository,
                ScriptedFailure::Network,
            ),
        );
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let err = cycle.run(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), "TransientClientError");
        // Project before the failure keeps its update.
        assert_eq!(repo.get(1).unwrap().updated_at, Some(write_time()));
        // Failed and later projects are untouched.
        assert!(repo.get(2).unwrap().updated_at.is_none());
        assert!(repo.get(3).unwrap().content.is_none());
        assert_eq!(host.call_count(HostCall::Repository, "gamma"), 0);
        assert_eq!(repo.updated_ids(), vec![1]);
    }

    #[tokio::test]
    async fn test_missing_remote_repository_is_not_found() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects([Project::listed(
            1, "gone", "", None, None,
        )]));
        let host = Arc::new(ScriptedHost::new());
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let err = cycle.run(&CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, CycleError::NotFound { ref owner, ref name } if owner == OWNER && name == "gone"));
    }

    #[tokio::test]
    async fn test_store_write_failure_aborts_cycle() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects(three_projects()));
        repo.fail_updates_for(2);
        let host = Arc::new(host_for(&["alpha", "beta", "gamma"]));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let err = cycle.run(&CancellationToken::new()).await.unwrap_err();

        assert_eq!(err.kind(), "StoreError");
        assert_eq!(repo.updated_ids(), vec![1]);
        assert_eq!(host.call_count(HostCall::Repository, "gamma"), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_is_store_error() {
        let repo = Arc::new(InMemoryProjectRepository::new());
        repo.fail_listing();
        let host = Arc::new(ScriptedHost::new());
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let err = cycle.run(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, CycleError::Store(_)));
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_skip_policy_continues_after_failure() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects(three_projects()));
        let host = Arc::new(
            host_for(&["alpha", "beta", "gamma"]).failing(
                "beta",
                HostCall::Readme,
                ScriptedFailure::RateLimited,
            ),
        );
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Skip);

        let report = cycle.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.refreshed, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].project_name, "beta");
        assert_eq!(report.failures[0].error.kind(), "TransientClientError");
        assert!(!report.is_clean());
        assert_eq!(repo.updated_ids(), vec![1, 3]);
        assert!(repo.get(2).unwrap().content.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_first_project() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects(three_projects()));
        let host = Arc::new(host_for(&["alpha", "beta", "gamma"]));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = cycle.run(&cancel).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.unvisited(), 3);
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_second_run_without_remote_changes_is_idempotent() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects([Project::listed(
            1, "demo", "", None, None,
        )]));
        let host = Arc::new(ScriptedHost::new().with_repo(
            "demo",
            ts("2024-01-01T00:00:00Z"),
            "https://github.com/u/demo",
            &["Go", "Shell"],
            "<h1>Demo</h1>",
        ));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        cycle.run(&CancellationToken::new()).await.unwrap();
        let first = repo.get(1).unwrap();

        clock.advance(chrono::Duration::hours(1));
        let report = cycle.run(&CancellationToken::new()).await.unwrap();
        let second = repo.get(1).unwrap();

        // Remote is older than the local write, so nothing is fetched again.
        assert_eq!(report.up_to_date, 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_inclusive_rule_retriggers_when_remote_equals_last_write() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects([Project::listed(
            1, "demo", "", None, None,
        )]));
        // Remote modification time coincides with the service's own write time.
        let host = Arc::new(ScriptedHost::new().with_repo(
            "demo",
            write_time(),
            "https://github.com/u/demo",
            &["Go", "Shell"],
            "<h1>Demo</h1>",
        ));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        cycle.run(&CancellationToken::new()).await.unwrap();
        let first = repo.get(1).unwrap();

        clock.advance(chrono::Duration::hours(1));
        let report = cycle.run(&CancellationToken::new()).await.unwrap();
        let second = repo.get(1).unwrap();

        // Re-triggered: fetched and written again with identical content.
        assert_eq!(report.refreshed, 1);
        assert_eq!(host.call_count(HostCall::Languages, "demo"), 2);
        assert_eq!(first.content, second.content);
        assert_eq!(first.languages, second.languages);
        assert_eq!(first.logo_alt_text, second.logo_alt_text);
        assert_eq!(first.github_url, second.github_url);
        // Only the timestamp differs.
        assert_eq!(
            second.updated_at,
            Some(write_time() + chrono::Duration::hours(1))
        );
    }

    #[tokio::test]
    async fn test_strict_rule_does_not_retrigger_on_equal_timestamps() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects([Project::listed(
            1,
            "demo",
            "",
            None,
            Some(write_time()),
        )]));
        let host = Arc::new(ScriptedHost::new().with_repo(
            "demo",
            write_time(),
            "https://github.com/u/demo",
            &[],
            "",
        ));
        let clock = Arc::new(FixedClock::at(write_time()));
        let settings = SyncSettings::new(OWNER).with_staleness_rule(StalenessRule::Strict);
        let cycle = UpdateCycle::new(repo.clone(), host.clone(), &settings).with_clock(clock);

        let report = cycle.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.up_to_date, 1);
        assert!(repo.updated_ids().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_projects_are_not_visited() {
        let repo = Arc::new(InMemoryProjectRepository::with_projects(three_projects()));
        repo.set_active(2, false).await.unwrap();
        let host = Arc::new(host_for(&["alpha", "beta", "gamma"]));
        let clock = Arc::new(FixedClock::at(write_time()));
        let cycle = build(&repo, &host, &clock, FailurePolicy::Abort);

        let report = cycle.run(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(host.call_count(HostCall::Repository, "beta"), 0);
    }
}
