//! Diagnostic counters for scheduler construction and topology registration.

use std::collections::HashSet;

use schedmetrics_core::Result;

use crate::catalogue::SchedulerMetrics;

/// What one pre-existing node contributed while a scheduler was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeTopologyCounts<'a> {
    pub node_name: &'a str,
    pub topologies: u64,
    pub inverse_topologies: u64,
}

impl SchedulerMetrics {
    /// Record one scheduler construction over `nodes`: one creation, one
    /// existing node per entry, and each node's topology counts. Nodes with
    /// zero topologies of a kind create no series for it.
    pub fn record_scheduler_construction(&self, nodes: &[NodeTopologyCounts<'_>]) -> Result<()> {
        self.record_scheduler_created(nodes.len() as u64)?;
        for n in nodes {
            if n.topologies > 0 {
                self.record_topologies_considered(n.node_name, n.topologies)?;
            }
            if n.inverse_topologies > 0 {
                self.record_inverse_topologies_considered(n.node_name, n.inverse_topologies)?;
            }
        }
        tracing::trace!(nodes = nodes.len(), "scheduler construction recorded");
        Ok(())
    }

    pub fn record_scheduler_created(&self, existing_nodes: u64) -> Result<()> {
        self.schedulers_created.inc(&[])?;
        self.existing_nodes.inc_by(&[], existing_nodes)
    }

    pub fn record_topologies_considered(&self, node_name: &str, topologies: u64) -> Result<()> {
        self.topologies_considered.inc_by(&[node_name], topologies)
    }

    pub fn record_inverse_topologies_considered(
        &self,
        node_name: &str,
        topologies: u64,
    ) -> Result<()> {
        self.inverse_topologies_considered
            .inc_by(&[node_name], topologies)
    }

    /// One domain examined during topology registration. `inserted` is only
    /// ever bumped together with `scanned`, and after it, so a concurrent
    /// snapshot never shows inserted > scanned for a domain.
    pub fn record_domain_scan(&self, domain: &str, newly_inserted: bool) -> Result<()> {
        self.domains_scanned.inc(&[domain])?;
        if newly_inserted {
            self.domains_inserted.inc(&[domain])?;
        }
        Ok(())
    }

    /// Insert `domain` into a topology group's tracking set and record the
    /// scan. Returns whether the domain was new to the set.
    pub fn track_domain(&self, domains: &mut HashSet<String>, domain: &str) -> Result<bool> {
        let inserted = !domains.contains(domain) && domains.insert(domain.to_string());
        self.record_domain_scan(domain, inserted)?;
        Ok(inserted)
    }
}
