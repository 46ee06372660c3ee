//! Shared application state for the exposition host.
//!
//! Startup errors are explicit (`Result` instead of panic): a duplicate or
//! invalid instrument definition must stop the process before it serves.

use std::sync::Arc;

use schedmetrics_core::error::Result;

use crate::catalogue::SchedulerMetrics;
use crate::config::RecorderConfig;
use crate::registry::Registry;
use crate::ticker::{spawn_unfinished_work_ticker, TickerHandle};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: RecorderConfig,
    registry: Registry,
    metrics: SchedulerMetrics,
    _ticker: TickerHandle,
}

impl AppState {
    /// Build the registry and catalogue from config and start the
    /// unfinished-work ticker. Must run inside a tokio runtime.
    pub fn new(cfg: RecorderConfig) -> Result<Self> {
        let registry = Registry::new();
        let settings = cfg.metrics.settings()?;
        let metrics = SchedulerMetrics::register(&registry, &settings)?;
        let ticker = spawn_unfinished_work_ticker(metrics.clone(), cfg.metrics.unfinished_work_tick());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                metrics,
                _ticker: ticker,
            }),
        })
    }

    pub fn cfg(&self) -> &RecorderConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn metrics(&self) -> &SchedulerMetrics {
        &self.inner.metrics
    }
}
