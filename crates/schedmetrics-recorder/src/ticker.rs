//! Periodic refresh of `unfinished_work_seconds` for in-flight runs.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::catalogue::SchedulerMetrics;

/// Owns the ticker task; the task is aborted when the handle is dropped.
#[derive(Debug)]
pub struct TickerHandle {
    handle: Option<JoinHandle<()>>,
}

impl TickerHandle {
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the task and wait for it to wind down.
    pub async fn stop(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Spawn the refresh loop on the current tokio runtime.
pub fn spawn_unfinished_work_ticker(metrics: SchedulerMetrics, period: Duration) -> TickerHandle {
    let period = period.max(Duration::from_millis(1));
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = metrics.refresh_unfinished_work() {
                tracing::warn!(error = %e, "unfinished work refresh failed");
            }
        }
    });
    tracing::debug!(period_ms = period.as_millis() as u64, "unfinished work ticker started");

    TickerHandle {
        handle: Some(handle),
    }
}
