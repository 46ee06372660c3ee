use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use schedmetrics_core::{buckets, InstrumentDesc, InstrumentKind, Result};

use super::{expect_kind, lookup_key, series_key, with_cell, SeriesKey};
use crate::registry::Collector;
use crate::snapshot::{BucketCount, HistogramSample, MetricFamily, SampleValue, Series};

/// Per-series state. `counts[i]` is the non-cumulative count for bucket `i`;
/// the last slot is the implicit `+Inf` bucket.
#[derive(Debug)]
struct HistogramCell {
    counts: Vec<u64>,
    sum: f64,
    count: u64,
}

impl HistogramCell {
    fn new(n_bounds: usize) -> Self {
        Self {
            counts: vec![0; n_bounds + 1],
            sum: 0.0,
            count: 0,
        }
    }
}

/// Histogram family over durations, in seconds.
#[derive(Debug)]
pub struct HistogramVec {
    desc: InstrumentDesc,
    bounds: Vec<f64>,
    series: DashMap<SeriesKey, Mutex<HistogramCell>>,
}

impl HistogramVec {
    pub fn new(desc: InstrumentDesc, bounds: Vec<f64>) -> Result<Self> {
        expect_kind(&desc, InstrumentKind::Histogram)?;
        buckets::validate(&bounds)?;
        Ok(Self {
            desc,
            bounds,
            series: DashMap::new(),
        })
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Record one observation. A `Duration` is never negative, so every
    /// observation lands in some bucket.
    pub fn observe(&self, labels: &[&str], d: Duration) -> Result<()> {
        let key = series_key(&self.desc, labels)?;
        let secs = d.as_secs_f64();
        let idx = self
            .bounds
            .iter()
            .position(|b| secs <= *b)
            .unwrap_or(self.bounds.len());
        let n = self.bounds.len();

        with_cell(&self.series, key, || Mutex::new(HistogramCell::new(n)), |cell| {
            // A poisoned cell still holds a consistent snapshot; nothing in
            // this section can panic midway.
            let mut h = cell.lock().unwrap_or_else(PoisonError::into_inner);
            h.counts[idx] += 1;
            h.sum += secs;
            h.count += 1;
        });
        Ok(())
    }

    /// Cumulative view of one series.
    pub fn sample(&self, labels: &[&str]) -> Option<HistogramSample> {
        self.series
            .get(&lookup_key(labels))
            .map(|cell| self.to_sample(cell.value()))
    }

    fn to_sample(&self, cell: &Mutex<HistogramCell>) -> HistogramSample {
        let h = cell.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cumulative = 0;
        let buckets = self
            .bounds
            .iter()
            .zip(h.counts.iter())
            .map(|(b, c)| {
                cumulative += c;
                BucketCount {
                    upper_bound: *b,
                    cumulative_count: cumulative,
                }
            })
            .collect();
        HistogramSample {
            buckets,
            sum: h.sum,
            count: h.count,
        }
    }
}

impl Collector for HistogramVec {
    fn desc(&self) -> &InstrumentDesc {
        &self.desc
    }

    fn collect(&self) -> MetricFamily {
        let series = self
            .series
            .iter()
            .map(|r| Series {
                label_values: r.key().clone(),
                value: SampleValue::Histogram(self.to_sample(r.value())),
            })
            .collect();
        MetricFamily::new(&self.desc, series)
    }
}
