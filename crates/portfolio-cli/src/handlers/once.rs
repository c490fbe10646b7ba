//! Once command handler.
//!
//! Runs a single update cycle through the same scheduler the `run` command
//! uses, so failures are reported to the error table the same way.

use anyhow::Result;
use portfolio_core::CycleReport;
use portfolio_runtime::SchedulerError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Run one cycle and print a summary.
///
/// Ctrl-C stops the cycle before its next project. A failed cycle, or one
/// that skipped failing projects, is an error.
pub async fn execute(ctx: &CliContext) -> Result<CycleReport> {
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current project");
                cancel.cancel();
            }
        })
    };

    let outcome = ctx.scheduler().run_once(&cancel).await;
    interrupt.abort();

    let report = match outcome {
        Ok(report) => report,
        Err(SchedulerError::Cycle(e)) => return Err(CliError::Cycle(e.to_string()).into()),
        Err(e) => return Err(e.into()),
    };

    print_summary(&report);

    if !report.failures.is_empty() {
        return Err(CliError::Cycle(format!(
            "{} project(s) failed",
            report.failures.len()
        ))
        .into());
    }
    Ok(report)
}

fn print_summary(report: &CycleReport) {
    println!(
        "Cycle finished in {:.1}s: {} project(s), {} refreshed, {} up to date, {} failed",
        report.elapsed.as_secs_f64(),
        report.total,
        report.refreshed,
        report.up_to_date,
        report.failures.len()
    );
    for failure in &report.failures {
        println!(
            "  #{} {}: {}",
            failure.project_id, failure.project_name, failure.error
        );
    }
    if report.cancelled {
        println!("Cancelled with {} project(s) not visited", report.unvisited());
    }
}
