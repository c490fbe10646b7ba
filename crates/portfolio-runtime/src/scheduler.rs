//! Cycle scheduler: runs the update cycle on a fixed interval.
//!
//! The scheduler owns its timer task internally, like a supervisor: callers
//! start, stop and query it without holding task handles themselves.
//!
//! - The first tick fires immediately after `start`.
//! - Cycles never overlap. A run-lock guards every invocation; a tick or a
//!   `run_once` that finds it held is skipped.
//! - `stop` cancels the token the running cycle checks between projects and
//!   waits for the timer task to finish.
//! - Every cycle outcome goes through the [`FailureReporter`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use portfolio_core::{CycleError, CycleReport, UpdateCycle};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::reporter::FailureReporter;

/// Upper bound on how long `stop` waits for an in-flight cycle.
const STOP_TIMEOUT: Duration = Duration::from_secs(120);

/// Handle to the running timer task.
struct SchedulerHandle {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<()>,
}

/// Status of the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerStatus {
    /// No timer is registered.
    Stopped,
    /// Timer is active.
    Running {
        /// Time between cycles.
        interval: Duration,
    },
    /// The timer task ended without being stopped.
    Crashed,
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Running { interval } => write!(f, "Running every {}s", interval.as_secs()),
            Self::Crashed => write!(f, "Crashed"),
        }
    }
}

/// Error from scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A timer is already active.
    #[error("Scheduler is already running (every {}s)", .0.as_secs())]
    AlreadyRunning(Duration),

    /// No timer is active.
    #[error("Scheduler is not running")]
    NotRunning,

    /// Another cycle holds the run-lock.
    #[error("An update cycle is already in progress")]
    Busy,

    /// The cycle itself failed (already reported).
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Everything a cycle invocation needs, shared with the timer task.
struct CycleRunner {
    cycle: Arc<UpdateCycle>,
    reporter: Arc<FailureReporter>,
    run_lock: Mutex<()>,
}

impl CycleRunner {
    /// Run one cycle unless another one holds the run-lock.
    ///
    /// Returns `None` when skipped. The outcome has already been reported.
    async fn run_guarded(
        &self,
        cancel: &CancellationToken,
    ) -> Option<Result<CycleReport, CycleError>> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            warn!("Previous update cycle still running, skipping");
            return None;
        };

        let outcome = self.cycle.run(cancel).await;
        self.reporter.report_outcome(&outcome).await;
        Some(outcome)
    }
}

/// Periodic driver for [`UpdateCycle`].
///
/// # Example
///
/// ```ignore
/// let scheduler = CycleScheduler::new(cycle, reporter, Duration::from_secs(3600));
/// scheduler.start().await?;
/// println!("Status: {}", scheduler.status().await);
/// scheduler.stop().await?;
/// ```
pub struct CycleScheduler {
    runner: Arc<CycleRunner>,
    interval: Duration,
    handle: Mutex<Option<SchedulerHandle>>,
}

impl CycleScheduler {
    pub fn new(
        cycle: Arc<UpdateCycle>,
        reporter: Arc<FailureReporter>,
        interval: Duration,
    ) -> Self {
        Self {
            runner: Arc::new(CycleRunner {
                cycle,
                reporter,
                run_lock: Mutex::new(()),
            }),
            interval,
            handle: Mutex::new(None),
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Register the timer. The first cycle starts right away.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` if a timer is active.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut guard = self.handle.lock().await;

        if let Some(old) = guard.take() {
            if !old.join_handle.is_finished() {
                *guard = Some(old);
                return Err(SchedulerError::AlreadyRunning(self.interval));
            }
            if let Err(e) = old.join_handle.await {
                warn!("Previous scheduler task panicked: {e}");
            }
        }

        let cancel_token = CancellationToken::new();
        let cancel_clone = cancel_token.clone();
        let runner = Arc::clone(&self.runner);
        let period = self.interval;

        let join_handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!(interval_secs = period.as_secs(), "Scheduler task starting");

            loop {
                tokio::select! {
                    biased;
                    () = cancel_clone.cancelled() => {
                        debug!("Scheduler task cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        runner.run_guarded(&cancel_clone).await;
                    }
                }
            }
        });

        info!(interval_secs = period.as_secs(), "Scheduler started");
        *guard = Some(SchedulerHandle {
            cancel_token,
            join_handle,
        });

        Ok(())
    }

    /// Deregister the timer and wait for the task to finish.
    ///
    /// An in-flight cycle stops before its next project.
    ///
    /// # Errors
    ///
    /// `NotRunning` if no timer is registered; `Internal` if the task
    /// panicked or did not finish in time.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let mut guard = self.handle.lock().await;

        let Some(handle) = guard.take() else {
            return Err(SchedulerError::NotRunning);
        };

        info!("Stopping scheduler");
        handle.cancel_token.cancel();

        let mut join = handle.join_handle;
        match tokio::time::timeout(STOP_TIMEOUT, &mut join).await {
            Ok(Ok(())) => {
                info!("Scheduler stopped cleanly");
                Ok(())
            }
            Ok(Err(join_err)) => {
                error!("Scheduler task panicked: {join_err}");
                Err(SchedulerError::Internal(format!("Task panicked: {join_err}")))
            }
            Err(_) => {
                warn!("Scheduler stop timed out; aborting task");
                join.abort();
                Err(SchedulerError::Internal(
                    "Scheduler stop timed out; task aborted".into(),
                ))
            }
        }
    }

    /// Current status.
    ///
    /// A task that finished without being cancelled is reported as
    /// `Crashed` once, then the handle is cleared.
    pub async fn status(&self) -> SchedulerStatus {
        let mut guard = self.handle.lock().await;

        let Some(handle) = guard.as_ref() else {
            return SchedulerStatus::Stopped;
        };

        if handle.join_handle.is_finished() {
            let was_cancelled = handle.cancel_token.is_cancelled();
            *guard = None;

            if was_cancelled {
                SchedulerStatus::Stopped
            } else {
                warn!("Detected crashed scheduler, cleaning up handle");
                SchedulerStatus::Crashed
            }
        } else {
            SchedulerStatus::Running {
                interval: self.interval,
            }
        }
    }

    /// Run a single cycle now, under the same run-lock as the timer.
    ///
    /// The outcome is reported before it is returned.
    ///
    /// # Errors
    ///
    /// `Busy` if a cycle is already running; `Cycle` if it failed.
    pub async fn run_once(
        &self,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, SchedulerError> {
        match self.runner.run_guarded(cancel).await {
            Some(outcome) => Ok(outcome?),
            None => Err(SchedulerError::Busy),
        }
    }
}

impl fmt::Debug for CycleScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleScheduler")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use portfolio_core::testing::{
        HostCall, InMemoryErrorLog, InMemoryProjectRepository, ScriptedFailure, ScriptedHost,
    };
    use portfolio_core::{
        HostPortResult, Project, RemoteRepository, RepoHostPort, SyncSettings,
    };

    const HOUR: Duration = Duration::from_secs(3600);

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn projects(names: &[&str]) -> Arc<InMemoryProjectRepository> {
        Arc::new(InMemoryProjectRepository::with_projects(
            names
                .iter()
                .zip(1..)
                .map(|(name, id)| Project::listed(id, *name, "x", None, None)),
        ))
    }

    fn scripted(names: &[&str]) -> ScriptedHost {
        names.iter().fold(ScriptedHost::new(), |host, name| {
            host.with_repo(
                name,
                ts("2024-01-01T00:00:00Z"),
                "https://github.com/u/x",
                &["Rust"],
                "<p/>",
            )
        })
    }

    /// Host that takes a while to answer metadata requests.
    struct SlowHost {
        inner: ScriptedHost,
        delay: Duration,
    }

    #[async_trait]
    impl RepoHostPort for SlowHost {
        async fn get_repository(
            &self,
            owner: &str,
            name: &str,
        ) -> HostPortResult<RemoteRepository> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_repository(owner, name).await
        }

        async fn get_languages(&self, owner: &str, name: &str) -> HostPortResult<Vec<String>> {
            self.inner.get_languages(owner, name).await
        }

        async fn get_readme_html(&self, owner: &str, name: &str) -> HostPortResult<String> {
            self.inner.get_readme_html(owner, name).await
        }
    }

    /// Host that panics, taking the timer task down with it.
    struct PanickingHost;

    #[async_trait]
    impl RepoHostPort for PanickingHost {
        async fn get_repository(&self, _: &str, _: &str) -> HostPortResult<RemoteRepository> {
            panic!("host exploded");
        }

        async fn get_languages(&self, _: &str, _: &str) -> HostPortResult<Vec<String>> {
            unreachable!()
        }

        async fn get_readme_html(&self, _: &str, _: &str) -> HostPortResult<String> {
            unreachable!()
        }
    }

    fn scheduler(
        repo: Arc<InMemoryProjectRepository>,
        host: Arc<dyn RepoHostPort>,
        log: Arc<InMemoryErrorLog>,
        settings: &SyncSettings,
    ) -> CycleScheduler {
        let cycle = Arc::new(UpdateCycle::new(repo, host, settings));
        let reporter = Arc::new(FailureReporter::new(log));
        CycleScheduler::new(cycle, reporter, settings.interval)
    }

    /// Let spawned tasks run until they block.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate_then_every_interval() {
        let host = Arc::new(scripted(&["a"]));
        let sched = scheduler(
            projects(&["a"]),
            host.clone(),
            Arc::new(InMemoryErrorLog::new()),
            &SyncSettings::new("u"),
        );

        sched.start().await.unwrap();
        settle().await;
        assert_eq!(host.call_count(HostCall::Repository, "a"), 1);

        tokio::time::sleep(HOUR / 2).await;
        assert_eq!(host.call_count(HostCall::Repository, "a"), 1);

        tokio::time::sleep(HOUR / 2).await;
        settle().await;
        assert_eq!(host.call_count(HostCall::Repository, "a"), 2);

        sched.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle() {
        let sched = scheduler(
            projects(&[]),
            Arc::new(ScriptedHost::new()),
            Arc::new(InMemoryErrorLog::new()),
            &SyncSettings::new("u"),
        );

        assert_eq!(sched.status().await, SchedulerStatus::Stopped);

        sched.start().await.unwrap();
        assert_eq!(
            sched.status().await,
            SchedulerStatus::Running { interval: HOUR }
        );

        assert!(matches!(
            sched.start().await,
            Err(SchedulerError::AlreadyRunning(_))
        ));

        sched.stop().await.unwrap();
        assert_eq!(sched.status().await, SchedulerStatus::Stopped);

        assert!(matches!(sched.stop().await, Err(SchedulerError::NotRunning)));

        // Restart after stop works.
        sched.start().await.unwrap();
        sched.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_between_projects() {
        let repo = projects(&["a", "b", "c"]);
        let host = Arc::new(SlowHost {
            inner: scripted(&["a", "b", "c"]),
            delay: Duration::from_secs(10),
        });
        let log = Arc::new(InMemoryErrorLog::new());
        let sched = scheduler(repo.clone(), host.clone(), log.clone(), &SyncSettings::new("u"));

        sched.start().await.unwrap();
        // "a" is done, "b" is waiting on the host.
        tokio::time::sleep(Duration::from_secs(15)).await;

        sched.stop().await.unwrap();

        // The in-flight project finishes; the next one is never started.
        assert_eq!(repo.updated_ids(), vec![1, 2]);
        assert_eq!(host.inner.call_count(HostCall::Repository, "c"), 0);
        assert!(log.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_once_while_cycle_running_is_busy() {
        let host = Arc::new(SlowHost {
            inner: scripted(&["a"]),
            delay: Duration::from_secs(10),
        });
        let sched = scheduler(
            projects(&["a"]),
            host.clone(),
            Arc::new(InMemoryErrorLog::new()),
            &SyncSettings::new("u"),
        );

        sched.start().await.unwrap();
        settle().await;

        let result = sched.run_once(&CancellationToken::new()).await;
        assert!(matches!(result, Err(SchedulerError::Busy)));

        sched.stop().await.unwrap();
        assert_eq!(host.inner.call_count(HostCall::Repository, "a"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_skipped_while_run_once_in_progress() {
        let host = Arc::new(SlowHost {
            inner: scripted(&["a"]),
            delay: Duration::from_secs(10),
        });
        let sched = Arc::new(scheduler(
            projects(&["a"]),
            host.clone(),
            Arc::new(InMemoryErrorLog::new()),
            &SyncSettings::new("u"),
        ));

        let once = {
            let sched = Arc::clone(&sched);
            tokio::spawn(async move { sched.run_once(&CancellationToken::new()).await })
        };
        settle().await;

        // First tick lands while the manual cycle holds the run-lock.
        sched.start().await.unwrap();
        settle().await;

        once.await.unwrap().unwrap();
        sched.stop().await.unwrap();

        assert_eq!(host.inner.call_count(HostCall::Repository, "a"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_recorded_once_and_timer_keeps_going() {
        let repo = projects(&["a", "b", "c"]);
        let host = Arc::new(scripted(&["a", "b", "c"]).failing(
            "b",
            HostCall::Repository,
            ScriptedFailure::Network,
        ));
        let log = Arc::new(InMemoryErrorLog::new());
        let sched = scheduler(repo.clone(), host.clone(), log.clone(), &SyncSettings::new("u"));

        sched.start().await.unwrap();
        settle().await;

        assert_eq!(repo.updated_ids(), vec![1]);
        let records = log.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].error_type, "TransientClientError");

        // Next tick starts fresh.
        tokio::time::sleep(HOUR).await;
        settle().await;
        assert_eq!(host.call_count(HostCall::Repository, "a"), 2);
        assert_eq!(log.records().len(), 2);
        assert!(matches!(
            sched.status().await,
            SchedulerStatus::Running { .. }
        ));

        sched.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_once_returns_and_reports_failure() {
        let log = Arc::new(InMemoryErrorLog::new());
        let sched = scheduler(
            projects(&["gone"]),
            Arc::new(ScriptedHost::new()),
            log.clone(),
            &SyncSettings::new("u"),
        );

        let err = sched
            .run_once(&CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SchedulerError::Cycle(CycleError::NotFound { .. })));
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].error_type, "NotFound");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_reports_crashed() {
        let sched = scheduler(
            projects(&["a"]),
            Arc::new(PanickingHost),
            Arc::new(InMemoryErrorLog::new()),
            &SyncSettings::new("u"),
        );

        sched.start().await.unwrap();
        settle().await;

        assert_eq!(sched.status().await, SchedulerStatus::Crashed);
        // Handle is cleared after a crash is observed.
        assert_eq!(sched.status().await, SchedulerStatus::Stopped);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            SchedulerStatus::Running { interval: HOUR }.to_string(),
            "Running every 3600s"
        );
        assert_eq!(SchedulerStatus::Crashed.to_string(), "Crashed");
    }
}
