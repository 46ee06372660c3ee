//! The scheduler's instrument catalogue.
//!
//! Four gauges, one histogram and six counters, registered together against
//! one registry. Names, label schemas and help texts are the exported
//! compatibility surface.

use std::sync::Arc;

use dashmap::DashMap;
use schedmetrics_core::buckets::DEFAULT_DURATION_BUCKETS;
use schedmetrics_core::labels::{
    CONTROLLER, DEFAULT_NAMESPACE, DOMAIN, NODE_NAME, SCHEDULER_SUBSYSTEM, SCHEDULING_ID,
};
use schedmetrics_core::{InstrumentDesc, InstrumentKind, Result};

use crate::clock::{Clock, SystemClock};
use crate::instruments::{CounterVec, GaugeVec, HistogramVec};
use crate::registry::Registry;
use crate::run::RunKey;

/// Registration-time knobs for the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSettings {
    /// Prefix for every exported name; may be empty.
    pub namespace: String,
    /// Upper bounds for `scheduling_duration_seconds`, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            duration_buckets: DEFAULT_DURATION_BUCKETS.to_vec(),
        }
    }
}

/// Handles to every scheduler instrument plus the in-flight run table.
///
/// Cloning is cheap and every clone records into the same series.
#[derive(Clone)]
pub struct SchedulerMetrics {
    pub(crate) scheduling_duration: Arc<HistogramVec>,
    pub(crate) queue_depth: Arc<GaugeVec>,
    pub(crate) unfinished_work: Arc<GaugeVec>,
    pub(crate) ignored_pod_count: Arc<GaugeVec>,
    pub(crate) unschedulable_pods: Arc<GaugeVec>,

    pub(crate) schedulers_created: Arc<CounterVec>,
    pub(crate) existing_nodes: Arc<CounterVec>,
    pub(crate) topologies_considered: Arc<CounterVec>,
    pub(crate) inverse_topologies_considered: Arc<CounterVec>,
    pub(crate) domains_scanned: Arc<CounterVec>,
    pub(crate) domains_inserted: Arc<CounterVec>,

    pub(crate) runs: Arc<DashMap<RunKey, std::time::Instant>>,
    pub(crate) clock: Arc<dyn Clock>,
}

struct Def {
    kind: InstrumentKind,
    subsystem: &'static str,
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
}

impl Def {
    fn desc(&self, namespace: &str) -> Result<InstrumentDesc> {
        InstrumentDesc::new(
            self.kind,
            namespace,
            self.subsystem,
            self.name,
            self.help,
            self.labels,
        )
    }
}

fn gauge(
    subsystem: &'static str,
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
) -> Def {
    Def {
        kind: InstrumentKind::Gauge,
        subsystem,
        name,
        help,
        labels,
    }
}

fn counter(name: &'static str, help: &'static str, labels: &'static [&'static str]) -> Def {
    Def {
        kind: InstrumentKind::Counter,
        subsystem: SCHEDULER_SUBSYSTEM,
        name,
        help,
        labels,
    }
}

impl SchedulerMetrics {
    /// Register the whole catalogue. Fails with `DuplicateRegistration` if
    /// any of it is already present in `registry`.
    pub fn register(registry: &Registry, settings: &MetricsSettings) -> Result<Self> {
        Self::register_with_clock(registry, settings, Arc::new(SystemClock))
    }

    pub fn register_with_clock(
        registry: &Registry,
        settings: &MetricsSettings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let ns = settings.namespace.as_str();

        let duration_desc = Def {
            kind: InstrumentKind::Histogram,
            subsystem: SCHEDULER_SUBSYSTEM,
            name: "scheduling_duration_seconds",
            help: "Duration of scheduling simulations used for deprovisioning and provisioning in seconds.",
            labels: &[CONTROLLER],
        }
        .desc(ns)?;
        let scheduling_duration = registry.register(HistogramVec::new(
            duration_desc,
            settings.duration_buckets.clone(),
        )?)?;

        let g = |d: Def| -> Result<Arc<GaugeVec>> { registry.register(GaugeVec::new(d.desc(ns)?)?) };
        let c = |d: Def| -> Result<Arc<CounterVec>> { registry.register(CounterVec::new(d.desc(ns)?)?) };

        let queue_depth = g(gauge(
            SCHEDULER_SUBSYSTEM,
            "queue_depth",
            "The number of pods currently waiting to be scheduled.",
            &[CONTROLLER, SCHEDULING_ID],
        ))?;
        let unfinished_work = g(gauge(
            SCHEDULER_SUBSYSTEM,
            "unfinished_work_seconds",
            "How many seconds of work has been done that is in progress and hasn't been observed by scheduling_duration_seconds.",
            &[CONTROLLER, SCHEDULING_ID],
        ))?;
        // Exported without the scheduler subsystem.
        let ignored_pod_count = g(gauge(
            "",
            "ignored_pod_count",
            "Number of pods ignored during scheduling by Karpenter",
            &[],
        ))?;
        let unschedulable_pods = g(gauge(
            SCHEDULER_SUBSYSTEM,
            "unschedulable_pods_count",
            "The number of unschedulable Pods.",
            &[CONTROLLER],
        ))?;

        let schedulers_created = c(counter(
            "logyball_new_scheduler_created_total",
            "The number of schedulers created (calls to NewScheduler).",
            &[],
        ))?;
        let existing_nodes = c(counter(
            "logyball_new_scheduler_existing_nodes_total",
            "The number of nodes existing in the cluster as considered by all runs of NewScheduler.",
            &[],
        ))?;
        let topologies_considered = c(counter(
            "logyball_new_scheduler_topologies_considered_total",
            "The number of topologies per node in the cluster as considered by all runs of NewScheduler.",
            &[NODE_NAME],
        ))?;
        let inverse_topologies_considered = c(counter(
            "logyball_new_scheduler_inverse_topologies_considered_total",
            "The number of inverse topologies per node in the cluster as considered by all runs of NewScheduler.",
            &[NODE_NAME],
        ))?;
        let domains_scanned = c(counter(
            "logyball_topology_groups_domains_scanned_total",
            "The number domains scanned when registering topologies.",
            &[DOMAIN],
        ))?;
        let domains_inserted = c(counter(
            "logyball_topology_groups_domains_inserted_total",
            "The number domains inserted into a new set when registering topologies.",
            &[DOMAIN],
        ))?;

        tracing::info!(
            namespace = %ns,
            instruments = registry.len(),
            "scheduler metrics registered"
        );

        Ok(Self {
            scheduling_duration,
            queue_depth,
            unfinished_work,
            ignored_pod_count,
            unschedulable_pods,
            schedulers_created,
            existing_nodes,
            topologies_considered,
            inverse_topologies_considered,
            domains_scanned,
            domains_inserted,
            runs: Arc::new(DashMap::new()),
            clock,
        })
    }

    /// Pods currently excluded from scheduling. Overwritten every pass.
    pub fn set_ignored_pod_count(&self, pods: usize) -> Result<()> {
        self.ignored_pod_count.set(&[], pods as f64)
    }

    /// Pods left unplaced at the end of the latest simulation for `controller`.
    pub fn set_unschedulable_pods(&self, controller: &str, pods: usize) -> Result<()> {
        self.unschedulable_pods.set(&[controller], pods as f64)
    }

    pub fn scheduling_duration(&self) -> &HistogramVec {
        &self.scheduling_duration
    }
    pub fn queue_depth(&self) -> &GaugeVec {
        &self.queue_depth
    }
    pub fn unfinished_work(&self) -> &GaugeVec {
        &self.unfinished_work
    }
    pub fn ignored_pod_count(&self) -> &GaugeVec {
        &self.ignored_pod_count
    }
    pub fn unschedulable_pods(&self) -> &GaugeVec {
        &self.unschedulable_pods
    }
    pub fn schedulers_created(&self) -> &CounterVec {
        &self.schedulers_created
    }
    pub fn existing_nodes(&self) -> &CounterVec {
        &self.existing_nodes
    }
    pub fn topologies_considered(&self) -> &CounterVec {
        &self.topologies_considered
    }
    pub fn inverse_topologies_considered(&self) -> &CounterVec {
        &self.inverse_topologies_considered
    }
    pub fn domains_scanned(&self) -> &CounterVec {
        &self.domains_scanned
    }
    pub fn domains_inserted(&self) -> &CounterVec {
        &self.domains_inserted
    }
}

impl std::fmt::Debug for SchedulerMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerMetrics")
            .field("in_flight_runs", &self.runs.len())
            .finish()
    }
}
