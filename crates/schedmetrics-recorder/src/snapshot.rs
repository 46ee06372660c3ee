//! Point-in-time view of every registered series.

use schedmetrics_core::{InstrumentDesc, InstrumentKind};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    families: Vec<MetricFamily>,
}

impl Snapshot {
    /// Families are sorted by exported name.
    pub(crate) fn new(mut families: Vec<MetricFamily>) -> Self {
        families.sort_by(|a, b| a.name.cmp(&b.name));
        Self { families }
    }

    pub fn families(&self) -> &[MetricFamily] {
        &self.families
    }

    pub fn family(&self, fq_name: &str) -> Option<&MetricFamily> {
        self.families.iter().find(|f| f.name == fq_name)
    }

    /// Total number of live series across all families.
    pub fn series_count(&self) -> usize {
        self.families.iter().map(|f| f.series.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: InstrumentKind,
    pub label_names: Vec<String>,
    pub series: Vec<Series>,
}

impl MetricFamily {
    /// Series are sorted by label values.
    pub(crate) fn new(desc: &InstrumentDesc, mut series: Vec<Series>) -> Self {
        series.sort_by(|a, b| a.label_values.cmp(&b.label_values));
        Self {
            name: desc.fq_name().to_string(),
            help: desc.help().to_string(),
            kind: desc.kind(),
            label_names: desc.label_names().to_vec(),
            series,
        }
    }

    pub fn series(&self, labels: &[&str]) -> Option<&Series> {
        self.series.iter().find(|s| {
            s.label_values.len() == labels.len()
                && s.label_values.iter().zip(labels).all(|(a, b)| a == b)
        })
    }

    pub fn counter(&self, labels: &[&str]) -> Option<u64> {
        match self.series(labels)?.value {
            SampleValue::Counter { value } => Some(value),
            _ => None,
        }
    }

    pub fn gauge(&self, labels: &[&str]) -> Option<f64> {
        match self.series(labels)?.value {
            SampleValue::Gauge { value } => Some(value),
            _ => None,
        }
    }

    pub fn histogram(&self, labels: &[&str]) -> Option<&HistogramSample> {
        match &self.series(labels)?.value {
            SampleValue::Histogram(h) => Some(h),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Series {
    /// Values in the family's declared label order.
    pub label_values: Vec<String>,
    pub value: SampleValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SampleValue {
    Counter { value: u64 },
    Gauge { value: f64 },
    Histogram(HistogramSample),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSample {
    /// Cumulative counts for each finite upper bound; `+Inf` equals `count`.
    pub buckets: Vec<BucketCount>,
    pub sum: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketCount {
    pub upper_bound: f64,
    pub cumulative_count: u64,
}
