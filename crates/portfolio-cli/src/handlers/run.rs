//! Run command handler: the long-running service.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use portfolio_runtime::SchedulerStatus;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// How often the scheduler is checked for a crash.
const WATCHDOG_PERIOD: Duration = Duration::from_secs(30);

/// Run the scheduler until Ctrl-C.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    run_until(ctx, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
        }
    })
    .await
}

/// Run the scheduler until `shutdown` completes, then stop it gracefully.
///
/// Fails if the scheduler task dies on its own.
pub async fn run_until(ctx: &CliContext, shutdown: impl Future<Output = ()>) -> Result<()> {
    let scheduler = ctx.scheduler();
    scheduler.start().await?;

    info!(
        owner = %ctx.settings.owner,
        interval_secs = scheduler.interval().as_secs(),
        policy = %ctx.settings.failure_policy,
        "Portfolio updater running; press Ctrl+C to stop"
    );

    let mut watchdog = interval(WATCHDOG_PERIOD);
    watchdog.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = watchdog.tick() => {
                if scheduler.status().await == SchedulerStatus::Crashed {
                    return Err(CliError::Cycle("scheduler task crashed".into()).into());
                }
            }
        }
    }

    info!("Shutting down");
    if let Err(e) = scheduler.stop().await {
        warn!("Scheduler did not stop cleanly: {e}");
    }
    Ok(())
}
