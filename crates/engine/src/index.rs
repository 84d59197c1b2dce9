//! The in-memory, concurrent, time-ordered index.
//!
//! One global `parking_lot::RwLock` guards a `metric -> (timestamp ->
//! bucket)` structure: a single lock over plain ordered maps, rather than a
//! lock-free structure layered under a coarse reader-writer lock, since the
//! lock alone already serializes writers. `query` takes a shared hold;
//! `insert` and the Retention Sweeper take an exclusive hold, and both
//! release it on every exit path via RAII guards.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tsdb_core::{DataPoint, Tags, Timestamp};

type Bucket = Vec<DataPoint>;
type PerMetric = BTreeMap<Timestamp, Bucket>;

/// The concurrent index owned by the Store.
#[derive(Default)]
pub struct Index {
    metrics: RwLock<HashMap<String, PerMetric>>,
}

impl Index {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one observation under its own metric, keyed by its own
    /// timestamp. Preserves insertion order within the bucket.
    pub fn insert(&self, dp: DataPoint) {
        let mut metrics = self.metrics.write();
        metrics
            .entry(dp.metric.clone())
            .or_default()
            .entry(dp.timestamp)
            .or_default()
            .push(dp);
    }

    /// Observations for `metric` in the half-open range `[start, end)`,
    /// ordered by timestamp ascending, ties broken by insertion order
    /// within a bucket. Degenerate ranges (`end <= start`) yield an empty
    /// result without touching the index.
    pub fn range_scan(&self, metric: &str, start: Timestamp, end: Timestamp) -> Vec<DataPoint> {
        if end <= start {
            return Vec::new();
        }
        let metrics = self.metrics.read();
        let Some(per_metric) = metrics.get(metric) else {
            return Vec::new();
        };
        per_metric
            .range(start..end)
            .flat_map(|(_, bucket)| bucket.iter().cloned())
            .collect()
    }

    /// Same as [`Self::range_scan`] but additionally applies a tag filter,
    /// admitting an observation iff it is a superset match.
    pub fn range_scan_filtered(
        &self,
        metric: &str,
        start: Timestamp,
        end: Timestamp,
        filters: &Tags,
    ) -> Vec<DataPoint> {
        if end <= start {
            return Vec::new();
        }
        let metrics = self.metrics.read();
        let Some(per_metric) = metrics.get(metric) else {
            return Vec::new();
        };
        per_metric
            .range(start..end)
            .flat_map(|(_, bucket)| bucket.iter())
            .filter(|dp| dp.matches(filters))
            .cloned()
            .collect()
    }

    /// Delete every observation strictly older than `cutoff`, across every
    /// metric, in one write hold. Returns the number of observations
    /// removed. Metrics left with no observations are dropped entirely so
    /// the outer map doesn't accumulate empty entries.
    pub fn prune_older_than(&self, cutoff: Timestamp) -> usize {
        let mut metrics = self.metrics.write();
        let mut removed = 0;
        metrics.retain(|_metric, per_metric| {
            let mut stale = std::mem::take(per_metric);
            let kept = stale.split_off(&cutoff);
            removed += stale.values().map(Vec::len).sum::<usize>();
            *per_metric = kept;
            !per_metric.is_empty()
        });
        removed
    }

    /// Number of distinct metrics currently indexed.
    pub fn metric_count(&self) -> usize {
        self.metrics.read().len()
    }

    /// Total number of observations currently indexed, across all metrics.
    pub fn observation_count(&self) -> usize {
        self.metrics
            .read()
            .values()
            .flat_map(|per_metric| per_metric.values())
            .map(Vec::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dp(metric: &str, ts: Timestamp) -> DataPoint {
        DataPoint::new(ts, metric, 1.0, Tags::new())
    }

    #[test]
    fn range_scan_is_half_open() {
        let index = Index::new();
        index.insert(dp("cpu", 0));
        index.insert(dp("cpu", 1000));
        index.insert(dp("cpu", 2000));

        let result = index.range_scan("cpu", 0, 1500);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].timestamp, 0);
        assert_eq!(result[1].timestamp, 1000);
    }

    #[test]
    fn unknown_metric_yields_empty() {
        let index = Index::new();
        assert!(index.range_scan("missing", 0, 100).is_empty());
    }

    #[test]
    fn degenerate_range_yields_empty() {
        let index = Index::new();
        index.insert(dp("cpu", 50));
        assert!(index.range_scan("cpu", 100, 100).is_empty());
        assert!(index.range_scan("cpu", 100, 50).is_empty());
    }

    #[test]
    fn bucket_preserves_insertion_order() {
        let index = Index::new();
        let mut a = dp("cpu", 0);
        a.value = 1.0;
        let mut b = dp("cpu", 0);
        b.value = 2.0;
        index.insert(a);
        index.insert(b);

        let result = index.range_scan("cpu", 0, 1);
        assert_eq!(result[0].value, 1.0);
        assert_eq!(result[1].value, 2.0);
    }

    #[test]
    fn metric_isolation() {
        let index = Index::new();
        index.insert(dp("cpu.usage", 0));
        index.insert(dp("memory.used", 0));

        assert_eq!(index.range_scan("cpu.usage", 0, 1).len(), 1);
        assert_eq!(index.range_scan("memory.used", 0, 1).len(), 1);
    }

    #[test]
    fn prune_removes_only_expired_and_empties_metric() {
        let index = Index::new();
        index.insert(dp("cpu", 0));
        index.insert(dp("cpu", 1000));
        index.insert(dp("disk", 500));

        let removed = index.prune_older_than(1000);
        assert_eq!(removed, 2); // cpu@0 and disk@500
        assert_eq!(index.observation_count(), 1);
        assert_eq!(index.range_scan("cpu", 0, 2000).len(), 1);
        assert_eq!(index.metric_count(), 1); // "disk" dropped entirely
    }

    #[test]
    fn duplicate_metric_timestamp_pairs_are_both_preserved() {
        let index = Index::new();
        let mut a = dp("cpu", 10);
        a.value = 1.0;
        let mut b = dp("cpu", 10);
        b.value = 2.0;
        index.insert(a);
        index.insert(b);

        assert_eq!(index.range_scan("cpu", 0, 100).len(), 2);
    }
}
