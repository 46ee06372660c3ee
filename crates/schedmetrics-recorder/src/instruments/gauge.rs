use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use schedmetrics_core::{InstrumentDesc, InstrumentKind, Result};

use super::{expect_kind, lookup_key, series_key, with_cell, SeriesKey};
use crate::registry::Collector;
use crate::snapshot::{MetricFamily, SampleValue, Series};

/// Gauge family. Values are stored as `f64` bit patterns so a set is a single
/// atomic store.
#[derive(Debug)]
pub struct GaugeVec {
    desc: InstrumentDesc,
    series: DashMap<SeriesKey, AtomicU64>,
}

impl GaugeVec {
    pub fn new(desc: InstrumentDesc) -> Result<Self> {
        expect_kind(&desc, InstrumentKind::Gauge)?;
        Ok(Self {
            desc,
            series: DashMap::new(),
        })
    }

    /// Overwrite the current value.
    pub fn set(&self, labels: &[&str], v: f64) -> Result<()> {
        let key = series_key(&self.desc, labels)?;
        let bits = v.to_bits();
        with_cell(&self.series, key, || AtomicU64::new(bits), |g| {
            g.store(bits, Ordering::Relaxed);
        });
        Ok(())
    }

    pub fn get(&self, labels: &[&str]) -> Option<f64> {
        self.series
            .get(&lookup_key(labels))
            .map(|g| f64::from_bits(g.value().load(Ordering::Relaxed)))
    }

    /// Drop the series entirely. Returns whether it existed.
    pub fn remove(&self, labels: &[&str]) -> Result<bool> {
        let key = series_key(&self.desc, labels)?;
        Ok(self.series.remove(&key).is_some())
    }
}

impl Collector for GaugeVec {
    fn desc(&self) -> &InstrumentDesc {
        &self.desc
    }

    fn collect(&self) -> MetricFamily {
        let series = self
            .series
            .iter()
            .map(|r| Series {
                label_values: r.key().clone(),
                value: SampleValue::Gauge {
                    value: f64::from_bits(r.value().load(Ordering::Relaxed)),
                },
            })
            .collect();
        MetricFamily::new(&self.desc, series)
    }
}
