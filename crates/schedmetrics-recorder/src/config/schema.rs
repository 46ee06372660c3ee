use std::net::SocketAddr;

use serde::Deserialize;
use schedmetrics_core::buckets::{self, DEFAULT_DURATION_BUCKETS};
use schedmetrics_core::error::{MetricsError, Result};
use schedmetrics_core::identity::is_valid_metric_name;
use schedmetrics_core::labels::DEFAULT_NAMESPACE;

use crate::catalogue::MetricsSettings;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecorderConfig {
    pub version: u32,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub exporter: ExporterSection,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::UnsupportedVersion);
        }
        self.metrics.validate()?;
        self.exporter.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub duration_buckets: BucketSpec,

    #[serde(default = "default_unfinished_work_tick_ms")]
    pub unfinished_work_tick_ms: u64,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            duration_buckets: BucketSpec::default(),
            unfinished_work_tick_ms: default_unfinished_work_tick_ms(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.namespace.is_empty() && !is_valid_metric_name(&self.namespace) {
            return Err(MetricsError::Config(format!(
                "metrics.namespace {:?} is not a valid metric name prefix",
                self.namespace
            )));
        }
        self.duration_buckets.resolve()?;
        if !(10..=60000).contains(&self.unfinished_work_tick_ms) {
            return Err(MetricsError::Config(
                "metrics.unfinished_work_tick_ms must be between 10 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn settings(&self) -> Result<MetricsSettings> {
        Ok(MetricsSettings {
            namespace: self.namespace.clone(),
            duration_buckets: self.duration_buckets.resolve()?,
        })
    }

    pub fn unfinished_work_tick(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.unfinished_work_tick_ms)
    }
}

/// Bucket layout for `scheduling_duration_seconds`.
///
/// ```yaml
/// duration_buckets: default
/// duration_buckets: { explicit: [0.1, 1, 10] }
/// duration_buckets: { exponential: { start: 0.005, factor: 2, count: 14 } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(try_from = "RawBucketSpec")]
pub enum BucketSpec {
    #[default]
    Default,
    Explicit(Vec<f64>),
    Exponential { start: f64, factor: f64, count: usize },
}

/// On-disk shape: the bare string `default` or a single-key map.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBucketSpec {
    Named(String),
    Explicit(ExplicitForm),
    Exponential(ExponentialForm),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExplicitForm {
    explicit: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExponentialForm {
    exponential: ExponentialParams,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExponentialParams {
    start: f64,
    factor: f64,
    count: usize,
}

impl TryFrom<RawBucketSpec> for BucketSpec {
    type Error = String;

    fn try_from(raw: RawBucketSpec) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawBucketSpec::Named(name) if name == "default" => Ok(BucketSpec::Default),
            RawBucketSpec::Named(name) => Err(format!(
                "unknown bucket layout {name:?} (expected default, explicit or exponential)"
            )),
            RawBucketSpec::Explicit(f) => Ok(BucketSpec::Explicit(f.explicit)),
            RawBucketSpec::Exponential(f) => Ok(BucketSpec::Exponential {
                start: f.exponential.start,
                factor: f.exponential.factor,
                count: f.exponential.count,
            }),
        }
    }
}

impl BucketSpec {
    pub fn resolve(&self) -> Result<Vec<f64>> {
        match self {
            BucketSpec::Default => Ok(DEFAULT_DURATION_BUCKETS.to_vec()),
            BucketSpec::Explicit(bounds) => {
                buckets::validate(bounds)?;
                Ok(bounds.clone())
            }
            BucketSpec::Exponential {
                start,
                factor,
                count,
            } => buckets::exponential(*start, *factor, *count),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            MetricsError::Config(format!("exporter.listen must be a socket address: {e}"))
        })
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}
fn default_unfinished_work_tick_ms() -> u64 {
    1000
}
fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
