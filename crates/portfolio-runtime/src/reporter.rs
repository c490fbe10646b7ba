//! Failure handler for update cycles.
//!
//! Every error that escapes a cycle, and every per-project failure collected
//! under the skip policy, is written once to the operational log and once to
//! the store's error table. Failing to write the error table is only logged.

use std::sync::Arc;

use portfolio_core::{
    Clock, CycleError, CycleReport, ErrorLogRepository, ErrorRecord, SystemClock,
};
use tracing::{error, warn};

/// Writes cycle failures to `tracing` and the error table.
pub struct FailureReporter {
    error_log: Arc<dyn ErrorLogRepository>,
    clock: Arc<dyn Clock>,
}

impl FailureReporter {
    pub fn new(error_log: Arc<dyn ErrorLogRepository>) -> Self {
        Self {
            error_log,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record one failure.
    pub async fn report(&self, failure: &CycleError) {
        error!(kind = failure.kind(), error = %failure, "Update cycle failed");
        self.persist(failure).await;
    }

    /// Record everything a finished cycle went wrong on.
    ///
    /// A clean report records nothing.
    pub async fn report_outcome(&self, outcome: &Result<CycleReport, CycleError>) {
        match outcome {
            Ok(report) => {
                for failure in &report.failures {
                    error!(
                        project_id = failure.project_id,
                        project = %failure.project_name,
                        kind = failure.error.kind(),
                        error = %failure.error,
                        "Project skipped after failure"
                    );
                    self.persist(&failure.error).await;
                }
            }
            Err(failure) => self.report(failure).await,
        }
    }

    async fn persist(&self, failure: &CycleError) {
        let record = ErrorRecord::from_error(failure, failure.kind(), self.clock.now());
        if let Err(e) = self.error_log.log_error(&record).await {
            warn!(error = %e, kind = failure.kind(), "Could not write error record");
        }
    }
}
