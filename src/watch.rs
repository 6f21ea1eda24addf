//! Periodic sidebar refresh.
//!
//! The sidebar re-runs the full refresh pipeline on a long interval and only
//! refetches pinned workflow runs on a short one, so running workflows stay
//! current without re-querying every pull request.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};

/// Default period of the full refresh.
pub const DEFAULT_FULL_REFRESH: Duration = Duration::from_secs(300);

/// Default period of the workflow-run refresh.
pub const DEFAULT_WORKFLOW_REFRESH: Duration = Duration::from_secs(60);

/// Periods of the two refresh loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    /// Period of the full refresh; the first one runs immediately.
    pub full_refresh: Duration,
    /// Period of the workflow-run refresh; the first one runs after one
    /// period.
    pub workflow_refresh: Duration,
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self {
            full_refresh: DEFAULT_FULL_REFRESH,
            workflow_refresh: DEFAULT_WORKFLOW_REFRESH,
        }
    }
}

impl RefreshSchedule {
    /// Builds a schedule from periods in seconds; zero falls back to the
    /// default period.
    #[must_use]
    pub const fn from_seconds(full_refresh: u64, workflow_refresh: u64) -> Self {
        Self {
            full_refresh: if full_refresh == 0 {
                DEFAULT_FULL_REFRESH
            } else {
                Duration::from_secs(full_refresh)
            },
            workflow_refresh: if workflow_refresh == 0 {
                DEFAULT_WORKFLOW_REFRESH
            } else {
                Duration::from_secs(workflow_refresh)
            },
        }
    }
}

/// Work performed on each tick.
///
/// Implementations report their own failures; a failed refresh never stops
/// the loop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTarget: Send + Sync {
    /// Runs the full refresh pipeline.
    async fn refresh_all(&self);

    /// Refetches the active runs of pinned workflows.
    async fn refresh_workflow_runs(&self);
}

/// Drives `target` on `schedule` until `shutdown` completes.
///
/// Ticks that come due while a refresh is still running are delayed rather
/// than replayed in a burst.
pub async fn watch<T, S>(target: &T, schedule: RefreshSchedule, shutdown: S)
where
    T: RefreshTarget + ?Sized,
    S: Future<Output = ()>,
{
    let mut full = interval(schedule.full_refresh);
    full.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut runs = interval_at(
        Instant::now() + schedule.workflow_refresh,
        schedule.workflow_refresh,
    );
    runs.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    tracing::info!(
        "watching: full refresh every {:?}, workflow runs every {:?}",
        schedule.full_refresh,
        schedule.workflow_refresh
    );
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = full.tick() => target.refresh_all().await,
            _ = runs.tick() => target.refresh_workflow_runs().await,
        }
    }
    tracing::info!("watch stopped");
}
