//! Scoped scheduling runs.
//!
//! A `SchedulingRun` owns the per-run series (`queue_depth` and
//! `unfinished_work_seconds` for its `scheduling_id`). Whatever way the run
//! ends (`complete`, `fail`, or being dropped on cancellation or unwind) the
//! duration is observed exactly once and both series are removed.
//!
//! Failed and abandoned runs are observed like successful ones: the
//! histogram carries no outcome label, so its count is the number of runs
//! that ended, whatever the result.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use schedmetrics_core::{MetricsError, Result};
use tracing::{debug, warn};

use crate::catalogue::SchedulerMetrics;

/// Identity of an in-flight run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunKey {
    pub controller: String,
    pub scheduling_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed,
    /// Dropped without an explicit outcome (cancellation, early return, panic).
    Abandoned,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Failed => "failed",
            RunOutcome::Abandoned => "abandoned",
        }
    }
}

#[must_use = "dropping a SchedulingRun ends it immediately"]
pub struct SchedulingRun {
    metrics: SchedulerMetrics,
    key: RunKey,
    started: Instant,
    finished: bool,
}

impl SchedulerMetrics {
    /// Begin a run. Fails with `RunInFlight` if the same (controller,
    /// scheduling_id) is already running, since both runs would write the
    /// same series.
    pub fn start_run(&self, controller: &str, scheduling_id: &str) -> Result<SchedulingRun> {
        let key = RunKey {
            controller: controller.to_string(),
            scheduling_id: scheduling_id.to_string(),
        };
        let started = self.clock.now();

        match self.runs.entry(key.clone()) {
            Entry::Occupied(_) => {
                return Err(MetricsError::RunInFlight {
                    controller: key.controller,
                    scheduling_id: key.scheduling_id,
                })
            }
            Entry::Vacant(v) => {
                v.insert(started);
            }
        }

        // From here on the guard owns cleanup.
        let run = SchedulingRun {
            metrics: self.clone(),
            key,
            started,
            finished: false,
        };
        run.metrics
            .unfinished_work
            .set(&run.labels(), 0.0)?;
        debug!(
            controller = %run.key.controller,
            scheduling_id = %run.key.scheduling_id,
            "scheduling run started"
        );
        Ok(run)
    }

    pub fn in_flight_runs(&self) -> usize {
        self.runs.len()
    }

    /// Set `unfinished_work_seconds` for every in-flight run to its elapsed
    /// time. Each gauge is written while the run's table entry is held, so a
    /// run that finishes concurrently cannot have its series recreated.
    pub fn refresh_unfinished_work(&self) -> Result<()> {
        let now = self.clock.now();
        for r in self.runs.iter() {
            let elapsed = now.saturating_duration_since(*r.value());
            let k = r.key();
            self.unfinished_work.set(
                &[k.controller.as_str(), k.scheduling_id.as_str()],
                elapsed.as_secs_f64(),
            )?;
        }
        Ok(())
    }
}

impl SchedulingRun {
    pub fn controller(&self) -> &str {
        &self.key.controller
    }

    pub fn scheduling_id(&self) -> &str {
        &self.key.scheduling_id
    }

    pub fn elapsed(&self) -> Duration {
        self.metrics.clock.now().saturating_duration_since(self.started)
    }

    /// Pods still awaiting a decision in this run.
    pub fn set_queue_depth(&self, pods: usize) -> Result<()> {
        self.metrics.queue_depth.set(&self.labels(), pods as f64)
    }

    /// Publish this run's elapsed time as unfinished work.
    pub fn tick(&self) -> Result<()> {
        self.metrics
            .unfinished_work
            .set(&self.labels(), self.elapsed().as_secs_f64())
    }

    /// End the run successfully with `unschedulable_pods` left unplaced.
    pub fn complete(mut self, unschedulable_pods: usize) -> Result<Duration> {
        let set = self
            .metrics
            .set_unschedulable_pods(&self.key.controller, unschedulable_pods);
        let elapsed = self.finish(RunOutcome::Completed)?;
        set?;
        Ok(elapsed)
    }

    /// End the run as failed. The duration up to the failure is observed.
    pub fn fail(mut self) -> Result<Duration> {
        self.finish(RunOutcome::Failed)
    }

    fn labels(&self) -> [&str; 2] {
        [self.key.controller.as_str(), self.key.scheduling_id.as_str()]
    }

    fn finish(&mut self, outcome: RunOutcome) -> Result<Duration> {
        self.finished = true;
        let elapsed = self.elapsed();

        let observed = self
            .metrics
            .scheduling_duration
            .observe(&[self.key.controller.as_str()], elapsed);

        // Series are removed while the table entry is still held: a new run
        // reusing this id cannot start, and the ticker cannot write, until
        // both are gone.
        let labels = self.labels();
        let (queue, unfinished) = match self.metrics.runs.entry(self.key.clone()) {
            Entry::Occupied(o) => {
                let queue = self.metrics.queue_depth.remove(&labels);
                let unfinished = self.metrics.unfinished_work.remove(&labels);
                o.remove();
                (queue, unfinished)
            }
            Entry::Vacant(_) => (Ok(false), Ok(false)),
        };

        debug!(
            controller = %self.key.controller,
            scheduling_id = %self.key.scheduling_id,
            outcome = outcome.as_str(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scheduling run finished"
        );

        observed?;
        queue?;
        unfinished?;
        Ok(elapsed)
    }
}

impl Drop for SchedulingRun {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!(
            controller = %self.key.controller,
            scheduling_id = %self.key.scheduling_id,
            "scheduling run dropped without an outcome"
        );
        // Failures were already logged where they happened.
        let _ = self.finish(RunOutcome::Abandoned);
    }
}

impl std::fmt::Debug for SchedulingRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulingRun")
            .field("key", &self.key)
            .field("finished", &self.finished)
            .finish()
    }
}
