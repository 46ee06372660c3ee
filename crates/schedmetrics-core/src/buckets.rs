//! Histogram bucket layouts (upper bounds, in seconds).

use crate::error::{MetricsError, Result};

/// Duration buckets shared with controller-runtime: fine resolution below
/// one second, coarser steps up to one minute.
pub const DEFAULT_DURATION_BUCKETS: [f64; 40] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.35, 0.4, 0.45, 0.5, 0.6, 0.7, 0.8,
    0.9, 1.0, 1.25, 1.5, 1.75, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0,
    15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0,
];

/// Geometric series `start * factor^i` for `i in 0..count`.
pub fn exponential(start: f64, factor: f64, count: usize) -> Result<Vec<f64>> {
    if count == 0 {
        return Err(MetricsError::InvalidBuckets("count must be >= 1".into()));
    }
    if !(start.is_finite() && start > 0.0) {
        return Err(MetricsError::InvalidBuckets(format!(
            "start must be positive and finite, got {start}"
        )));
    }
    if !(factor.is_finite() && factor > 1.0) {
        return Err(MetricsError::InvalidBuckets(format!(
            "factor must be > 1, got {factor}"
        )));
    }

    let mut out = Vec::with_capacity(count);
    let mut b = start;
    for _ in 0..count {
        out.push(b);
        b *= factor;
    }
    validate(&out)?;
    Ok(out)
}

/// Buckets must be non-empty, finite and strictly increasing. The implicit
/// `+Inf` bucket is never listed explicitly.
pub fn validate(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(MetricsError::InvalidBuckets("must not be empty".into()));
    }
    for w in bounds.windows(2) {
        if w[1] <= w[0] {
            return Err(MetricsError::InvalidBuckets(format!(
                "must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }
    }
    if let Some(b) = bounds.iter().find(|b| !b.is_finite()) {
        return Err(MetricsError::InvalidBuckets(format!("non-finite bound {b}")));
    }
    Ok(())
}
