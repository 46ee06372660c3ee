//! Instrument identity and label schema.
//!
//! An instrument is identified by its fully qualified name, built from the
//! non-empty parts of (namespace, subsystem, name). Its label schema is an
//! ordered list of label names fixed at construction time.

use serde::Serialize;

use crate::error::{MetricsError, Result};

/// Instrument family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Counter,
    Gauge,
    Histogram,
}

impl InstrumentKind {
    /// Name used on `# TYPE` lines.
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::Gauge => "gauge",
            InstrumentKind::Histogram => "histogram",
        }
    }
}

/// Immutable description of one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentDesc {
    namespace: String,
    subsystem: String,
    name: String,
    fq_name: String,
    help: String,
    kind: InstrumentKind,
    label_names: Vec<String>,
}

impl InstrumentDesc {
    pub fn new(
        kind: InstrumentKind,
        namespace: &str,
        subsystem: &str,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(MetricsError::InvalidName("name must not be empty".into()));
        }
        let fq_name = build_fq_name(namespace, subsystem, name);
        if !is_valid_metric_name(&fq_name) {
            return Err(MetricsError::InvalidName(fq_name));
        }

        let mut labels: Vec<String> = Vec::with_capacity(label_names.len());
        for l in label_names {
            if !is_valid_label_name(l) {
                return Err(MetricsError::InvalidLabel(format!("{fq_name}: {l:?}")));
            }
            if kind == InstrumentKind::Histogram && *l == "le" {
                return Err(MetricsError::InvalidLabel(format!(
                    "{fq_name}: \"le\" is reserved for histogram buckets"
                )));
            }
            if labels.iter().any(|x| x == l) {
                return Err(MetricsError::InvalidLabel(format!(
                    "{fq_name}: duplicate label {l:?}"
                )));
            }
            labels.push((*l).to_string());
        }

        Ok(Self {
            namespace: namespace.to_string(),
            subsystem: subsystem.to_string(),
            name: name.to_string(),
            fq_name,
            help: help.to_string(),
            kind,
            label_names: labels,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Exported name.
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }
    pub fn help(&self) -> &str {
        &self.help
    }
    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Check that a write supplies exactly the declared number of labels.
    pub fn check_arity(&self, got: usize) -> Result<()> {
        if got != self.label_names.len() {
            return Err(MetricsError::LabelArity {
                fq_name: self.fq_name.clone(),
                expected: self.label_names.len(),
                got,
            });
        }
        Ok(())
    }
}

/// Join the non-empty parts with `_`.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, excluding the reserved `__` prefix.
pub fn is_valid_label_name(s: &str) -> bool {
    if s.starts_with("__") {
        return false;
    }
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
