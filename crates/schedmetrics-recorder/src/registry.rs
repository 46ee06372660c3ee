//! Metric registry: owns every instrument and hands out typed handles.
//!
//! A registry is an explicitly constructed value, cloned (cheaply, via
//! `Arc`) into whatever records metrics. Tests build a fresh one each.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use schedmetrics_core::{InstrumentDesc, MetricsError, Result};
use tracing::{debug, error};

use crate::snapshot::{MetricFamily, Snapshot};

/// Anything the registry can gather a family from.
pub trait Collector: Send + Sync {
    fn desc(&self) -> &InstrumentDesc;
    fn collect(&self) -> MetricFamily;
}

#[derive(Clone, Default)]
pub struct Registry {
    collectors: Arc<DashMap<String, Arc<dyn Collector>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instrument and return a shared handle to it.
    ///
    /// A second instrument with the same fully qualified name is rejected
    /// with `DuplicateRegistration`; the first registration stays in place.
    pub fn register<C>(&self, collector: C) -> Result<Arc<C>>
    where
        C: Collector + 'static,
    {
        let collector = Arc::new(collector);
        let fq_name = collector.desc().fq_name().to_string();

        match self.collectors.entry(fq_name) {
            Entry::Occupied(o) => {
                error!(fq_name = %o.key(), "duplicate instrument registration");
                Err(MetricsError::DuplicateRegistration {
                    fq_name: o.key().clone(),
                })
            }
            Entry::Vacant(v) => {
                debug!(
                    fq_name = %v.key(),
                    kind = collector.desc().kind().as_str(),
                    "instrument registered"
                );
                v.insert(collector.clone() as Arc<dyn Collector>);
                Ok(collector)
            }
        }
    }

    pub fn contains(&self, fq_name: &str) -> bool {
        self.collectors.contains_key(fq_name)
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Gather every family. Collector handles are cloned out first so no map
    /// lock is held while individual series are read.
    pub fn collect(&self) -> Snapshot {
        let collectors: Vec<Arc<dyn Collector>> =
            self.collectors.iter().map(|r| Arc::clone(r.value())).collect();
        Snapshot::new(collectors.iter().map(|c| c.collect()).collect())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("instruments", &self.collectors.len())
            .finish()
    }
}
