#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use schedmetrics_core::buckets::DEFAULT_DURATION_BUCKETS;
use schedmetrics_core::MetricsError;
use schedmetrics_recorder::config::{self, BucketSpec};

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.metrics.namespace, "karpenter");
    assert_eq!(cfg.metrics.duration_buckets, BucketSpec::Default);
    assert_eq!(cfg.metrics.unfinished_work_tick(), Duration::from_secs(1));
    assert_eq!(cfg.exporter.listen, "0.0.0.0:8080");

    let settings = cfg.metrics.settings().unwrap();
    assert_eq!(settings.duration_buckets, DEFAULT_DURATION_BUCKETS.to_vec());
}

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
metrics:
  namespase: "karpenter" # typo should fail
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, MetricsError::Config(_)));
    assert!(err.is_fatal());
}

#[test]
fn explicit_and_exponential_buckets() {
    let explicit = r#"
version: 1
metrics:
  duration_buckets:
    explicit: [0.1, 1, 10]
"#;
    let cfg = config::load_from_str(explicit).unwrap();
    assert_eq!(cfg.metrics.settings().unwrap().duration_buckets, vec![0.1, 1.0, 10.0]);

    let exponential = r#"
version: 1
metrics:
  namespace: ""
  duration_buckets:
    exponential: { start: 0.5, factor: 2, count: 3 }
"#;
    let cfg = config::load_from_str(exponential).unwrap();
    let settings = cfg.metrics.settings().unwrap();
    assert_eq!(settings.namespace, "");
    assert_eq!(settings.duration_buckets, vec![0.5, 1.0, 2.0]);
}

#[test]
fn rejects_invalid_values() {
    let unsorted = "version: 1\nmetrics:\n  duration_buckets:\n    explicit: [1, 0.5]\n";
    assert!(matches!(
        config::load_from_str(unsorted),
        Err(MetricsError::InvalidBuckets(_))
    ));

    let version = "version: 2\n";
    assert_eq!(config::load_from_str(version).unwrap_err(), MetricsError::UnsupportedVersion);

    let tick = "version: 1\nmetrics:\n  unfinished_work_tick_ms: 0\n";
    assert!(matches!(config::load_from_str(tick), Err(MetricsError::Config(_))));

    let ns = "version: 1\nmetrics:\n  namespace: \"kar-penter\"\n";
    assert!(matches!(config::load_from_str(ns), Err(MetricsError::Config(_))));

    let listen = "version: 1\nexporter:\n  listen: \"nowhere\"\n";
    assert!(matches!(config::load_from_str(listen), Err(MetricsError::Config(_))));
}
