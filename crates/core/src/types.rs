//! The data model: observations and their tag sets.

use std::collections::BTreeMap;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// A tag set attached to one observation.
///
/// Backed by a `BTreeMap` so two tag sets with the same contents always
/// iterate (and therefore encode to the WAL) in the same order; tag order
/// is not otherwise meaningful, but this makes WAL output and test
/// assertions deterministic.
pub type Tags = BTreeMap<String, String>;

/// Returns `true` iff every (key, value) pair in `filters` is present and
/// equal in `tags`. An empty or absent filter set matches everything.
pub fn matches_filters(tags: &Tags, filters: &Tags) -> bool {
    filters.iter().all(|(k, v)| tags.get(k).map(|tv| tv == v).unwrap_or(false))
}

/// A single tagged numeric observation.
///
/// Immutable once constructed. Two observations are permitted to be
/// identical, or to share a `(metric, timestamp)` pair while differing in
/// `value`/`tags` — the store preserves both (see [`matches_filters`] for
/// query-time filtering, not dedup).
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Milliseconds since the Unix epoch.
    pub timestamp: Timestamp,
    /// Opaque metric name; never empty.
    pub metric: String,
    /// IEEE-754 double; NaN and infinities are permitted.
    pub value: f64,
    /// Tag set; may be empty.
    pub tags: Tags,
}

impl DataPoint {
    /// Construct a new observation.
    pub fn new(timestamp: Timestamp, metric: impl Into<String>, value: f64, tags: Tags) -> Self {
        Self {
            timestamp,
            metric: metric.into(),
            value,
            tags,
        }
    }

    /// `true` iff `self.tags` is a superset of `filters`.
    pub fn matches(&self, filters: &Tags) -> bool {
        matches_filters(&self.tags, filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        let dp = DataPoint::new(0, "cpu", 1.0, Tags::new());
        assert!(dp.matches(&Tags::new()));
    }

    #[test]
    fn filter_requires_every_pair() {
        let mut tags = Tags::new();
        tags.insert("host".into(), "s1".into());
        tags.insert("dc".into(), "west".into());
        let dp = DataPoint::new(0, "cpu", 1.0, tags);

        let mut filter = Tags::new();
        filter.insert("host".into(), "s1".into());
        assert!(dp.matches(&filter));

        filter.insert("dc".into(), "east".into());
        assert!(!dp.matches(&filter));
    }

    #[test]
    fn filter_on_absent_key_fails() {
        let dp = DataPoint::new(0, "cpu", 1.0, Tags::new());
        let mut filter = Tags::new();
        filter.insert("host".into(), "s1".into());
        assert!(!dp.matches(&filter));
    }
}
