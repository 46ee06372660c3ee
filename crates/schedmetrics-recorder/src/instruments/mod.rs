//! Label-partitioned instrument families.
//!
//! Every family keeps one cell per concrete label-value tuple in a sharded
//! `DashMap`. Counter and gauge cells are single atomics; histogram cells sit
//! behind their own mutex so count, sum and buckets move together. Series are
//! created lazily on first write.

mod counter;
mod gauge;
mod histogram;

pub use counter::CounterVec;
pub use gauge::GaugeVec;
pub use histogram::HistogramVec;

use dashmap::DashMap;
use schedmetrics_core::{InstrumentDesc, InstrumentKind, MetricsError, Result};

/// Series key: label values in declared schema order.
pub(crate) type SeriesKey = Vec<String>;

/// Validate arity and build the series key. Arity mismatch is a caller
/// defect, so it is logged at error level here even if the caller drops the
/// returned error.
pub(crate) fn series_key(desc: &InstrumentDesc, labels: &[&str]) -> Result<SeriesKey> {
    if let Err(e) = desc.check_arity(labels.len()) {
        tracing::error!(
            fq_name = %desc.fq_name(),
            expected = desc.label_names().len(),
            got = labels.len(),
            "label arity mismatch"
        );
        return Err(e);
    }
    Ok(labels.iter().map(|v| v.to_string()).collect())
}

pub(crate) fn expect_kind(desc: &InstrumentDesc, kind: InstrumentKind) -> Result<()> {
    if desc.kind() != kind {
        return Err(MetricsError::Internal(format!(
            "{} is declared as {}, not {}",
            desc.fq_name(),
            desc.kind().as_str(),
            kind.as_str()
        )));
    }
    Ok(())
}

/// Run `f` against the cell for `key`, creating it with `init` if missing.
/// Existing cells are reached under the shard read lock only.
pub(crate) fn with_cell<V, R>(
    map: &DashMap<SeriesKey, V>,
    key: SeriesKey,
    init: impl FnOnce() -> V,
    f: impl FnOnce(&V) -> R,
) -> R {
    if let Some(cell) = map.get(&key) {
        return f(cell.value());
    }
    let cell = map.entry(key).or_insert_with(init).downgrade();
    f(cell.value())
}

/// Lookup without creating the series. Wrong arity simply finds nothing.
pub(crate) fn lookup_key(labels: &[&str]) -> SeriesKey {
    labels.iter().map(|v| v.to_string()).collect()
}
