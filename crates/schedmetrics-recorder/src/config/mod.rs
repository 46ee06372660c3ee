//! Recorder config loader (strict parsing).

pub mod schema;

use std::fs;

use schedmetrics_core::error::{MetricsError, Result};

pub use schema::{BucketSpec, ExporterSection, MetricsSection, RecorderConfig};

pub fn load_from_file(path: &str) -> Result<RecorderConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RecorderConfig> {
    let cfg: RecorderConfig =
        serde_yaml::from_str(s).map_err(|e| MetricsError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
