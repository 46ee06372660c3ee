//! Prometheus text exposition (format 0.0.4).

use std::fmt::Write;

use schedmetrics_core::InstrumentKind;

use crate::snapshot::{MetricFamily, SampleValue, Snapshot};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else {
        v.to_string()
    }
}

fn label_pairs(names: &[String], values: &[String]) -> Vec<String> {
    names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect()
}

fn braces(pairs: &[String]) -> String {
    if pairs.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", pairs.join(","))
    }
}

impl Snapshot {
    /// Render every family in text exposition format.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for family in self.families() {
            render_family(family, &mut out);
        }
        out
    }
}

fn render_family(family: &MetricFamily, out: &mut String) {
    let name = &family.name;
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(&family.help));
    let _ = writeln!(out, "# TYPE {} {}", name, family.kind.as_str());

    for s in &family.series {
        let pairs = label_pairs(&family.label_names, &s.label_values);
        match (&s.value, family.kind) {
            (SampleValue::Counter { value }, InstrumentKind::Counter) => {
                let _ = writeln!(out, "{}{} {}", name, braces(&pairs), value);
            }
            (SampleValue::Gauge { value }, InstrumentKind::Gauge) => {
                let _ = writeln!(out, "{}{} {}", name, braces(&pairs), format_float(*value));
            }
            (SampleValue::Histogram(h), InstrumentKind::Histogram) => {
                for b in &h.buckets {
                    let mut with_le = pairs.clone();
                    with_le.push(format!("le=\"{}\"", format_float(b.upper_bound)));
                    let _ = writeln!(out, "{}_bucket{} {}", name, braces(&with_le), b.cumulative_count);
                }
                let mut with_inf = pairs.clone();
                with_inf.push("le=\"+Inf\"".to_string());
                let _ = writeln!(out, "{}_bucket{} {}", name, braces(&with_inf), h.count);
                let _ = writeln!(out, "{}_sum{} {}", name, braces(&pairs), format_float(h.sum));
                let _ = writeln!(out, "{}_count{} {}", name, braces(&pairs), h.count);
            }
            (value, kind) => {
                tracing::error!(
                    fq_name = %name,
                    family_kind = kind.as_str(),
                    ?value,
                    "sample kind does not match family kind; skipped"
                );
            }
        }
    }
}
