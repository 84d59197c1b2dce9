//! `tsdb query` argument handling.

use tsdb_core::{DataPoint, Tags};
use tsdb_engine::Store;

/// Parse `key=value` tag filter arguments. A malformed entry (no `=`) is
/// skipped with a warning rather than aborting the whole query.
pub fn parse_tag_filters(raw: &[String]) -> Tags {
    let mut tags = Tags::new();
    for entry in raw {
        match entry.split_once('=') {
            Some((k, v)) => {
                tags.insert(k.to_string(), v.to_string());
            }
            None => tracing::warn!(entry = %entry, "ignoring malformed --tag filter, expected KEY=VALUE"),
        }
    }
    tags
}

/// Run a query and return the matched observations.
pub fn run(store: &Store, metric: &str, start: i64, end: i64, filters: &Tags) -> Vec<DataPoint> {
    store.query(metric, start, end, Some(filters))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_pairs_and_skips_invalid_ones() {
        let tags = parse_tag_filters(&["host=server1".to_string(), "garbage".to_string(), "dc=west".to_string()]);
        assert_eq!(tags.len(), 2);
        assert_eq!(tags.get("host"), Some(&"server1".to_string()));
        assert_eq!(tags.get("dc"), Some(&"west".to_string()));
    }
}
