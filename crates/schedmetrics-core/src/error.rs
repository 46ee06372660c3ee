//! Shared error type across schedmetrics crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and recorder.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricsError {
    #[error("instrument already registered: {fq_name}")]
    DuplicateRegistration { fq_name: String },
    #[error("label arity mismatch on {fq_name}: expected {expected} values, got {got}")]
    LabelArity {
        fq_name: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid metric name: {0}")]
    InvalidName(String),
    #[error("invalid label: {0}")]
    InvalidLabel(String),
    #[error("invalid buckets: {0}")]
    InvalidBuckets(String),
    #[error("scheduling run already in flight (controller={controller}, scheduling_id={scheduling_id})")]
    RunInFlight {
        controller: String,
        scheduling_id: String,
    },
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Configuration-time failures. The process must refuse to start on these.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MetricsError::DuplicateRegistration { .. }
                | MetricsError::InvalidName(_)
                | MetricsError::InvalidLabel(_)
                | MetricsError::InvalidBuckets(_)
                | MetricsError::UnsupportedVersion
                | MetricsError::Config(_)
        )
    }
}
