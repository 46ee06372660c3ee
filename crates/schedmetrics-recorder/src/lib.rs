//! schedmetrics recorder library entry.
//!
//! Wires the registry, the instrument families, the scheduler catalogue and
//! the scoped run lifecycle together, plus the config loader and the
//! exposition routes used by the binary (`main.rs`) and integration tests.

pub mod app_state;
pub mod catalogue;
pub mod clock;
pub mod config;
pub mod exposition;
pub mod instruments;
pub mod ops;
pub mod registry;
pub mod router;
pub mod run;
pub mod snapshot;
pub mod ticker;
pub mod topology;

pub use catalogue::{MetricsSettings, SchedulerMetrics};
pub use registry::{Collector, Registry};
pub use run::{RunKey, RunOutcome, SchedulingRun};
pub use snapshot::Snapshot;
pub use topology::NodeTopologyCounts;
