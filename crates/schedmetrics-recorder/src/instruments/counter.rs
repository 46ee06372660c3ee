use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use schedmetrics_core::{InstrumentDesc, InstrumentKind, Result};

use super::{expect_kind, lookup_key, series_key, with_cell, SeriesKey};
use crate::registry::Collector;
use crate::snapshot::{MetricFamily, SampleValue, Series};

/// Counter family. Values only ever increase.
#[derive(Debug)]
pub struct CounterVec {
    desc: InstrumentDesc,
    series: DashMap<SeriesKey, AtomicU64>,
}

impl CounterVec {
    pub fn new(desc: InstrumentDesc) -> Result<Self> {
        expect_kind(&desc, InstrumentKind::Counter)?;
        Ok(Self {
            desc,
            series: DashMap::new(),
        })
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[&str]) -> Result<()> {
        self.inc_by(labels, 1)
    }

    /// Increment by an arbitrary amount.
    pub fn inc_by(&self, labels: &[&str], v: u64) -> Result<()> {
        let key = series_key(&self.desc, labels)?;
        with_cell(&self.series, key, || AtomicU64::new(0), |c| {
            c.fetch_add(v, Ordering::Relaxed);
        });
        Ok(())
    }

    /// Current value, `None` if the series was never written.
    pub fn get(&self, labels: &[&str]) -> Option<u64> {
        self.series
            .get(&lookup_key(labels))
            .map(|c| c.value().load(Ordering::Relaxed))
    }
}

impl Collector for CounterVec {
    fn desc(&self) -> &InstrumentDesc {
        &self.desc
    }

    fn collect(&self) -> MetricFamily {
        let series = self
            .series
            .iter()
            .map(|r| Series {
                label_values: r.key().clone(),
                value: SampleValue::Counter {
                    value: r.value().load(Ordering::Relaxed),
                },
            })
            .collect();
        MetricFamily::new(&self.desc, series)
    }
}
