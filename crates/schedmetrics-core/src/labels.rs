//! Label names shared by the scheduler instruments.
//!
//! These are part of the exported compatibility surface; renaming one
//! breaks every dashboard and alert keyed on it.

/// Controller loop that invoked scheduling (provisioning, disruption, ...).
pub const CONTROLLER: &str = "controller";

/// Per-invocation id of an in-flight scheduling run.
pub const SCHEDULING_ID: &str = "scheduling_id";

/// Node evaluated while constructing a scheduler.
pub const NODE_NAME: &str = "node_name";

/// Topology domain key under evaluation.
pub const DOMAIN: &str = "domain";

/// Subsystem prefix for everything the scheduler exports.
pub const SCHEDULER_SUBSYSTEM: &str = "scheduler";

/// Default namespace prefix.
pub const DEFAULT_NAMESPACE: &str = "karpenter";
