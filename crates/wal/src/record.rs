//! Text encoding for one WAL line.
//!
//! `timestamp,metric,value,tags` with `tags` a `;`-separated list of
//! `key=value` pairs. The characters `, ; = \` are backslash-escaped
//! wherever they appear inside `metric`, a tag key, or a tag value; `value`
//! is a bare decimal float and is never escaped. This is a state-machine
//! parser, not a regex.

use std::fmt;
use tsdb_core::{DataPoint, Tags, Timestamp};

/// A WAL line failed to parse into an observation.
#[derive(Debug)]
pub struct ParseError {
    reason: &'static str,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed WAL record: {}", self.reason)
    }
}

impl std::error::Error for ParseError {}

fn parse_error(reason: &'static str) -> ParseError {
    ParseError { reason }
}

/// Escape `, ; = \` with a preceding backslash.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, ',' | ';' | '=' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Reverse of [`escape`]. An escape sequence whose second character is not
/// one of `, ; = \` is treated as that literal character (unknown escapes
/// degrade to the literal second character, per the grammar).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Byte offsets of every unescaped occurrence of `sep` in `s`.
fn unescaped_positions(s: &str, sep: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == sep {
            positions.push(i);
        }
    }
    positions
}

/// Split `s` at its first `n` unescaped occurrences of `sep`, returning
/// `n + 1` slices. `None` if fewer than `n` unescaped separators exist.
fn split_first_n_unescaped(s: &str, sep: char, n: usize) -> Option<Vec<&str>> {
    let positions = unescaped_positions(s, sep);
    if positions.len() < n {
        return None;
    }
    let mut parts = Vec::with_capacity(n + 1);
    let mut start = 0;
    for &pos in positions.iter().take(n) {
        parts.push(&s[start..pos]);
        start = pos + sep.len_utf8();
    }
    parts.push(&s[start..]);
    Some(parts)
}

/// Split `s` at every unescaped occurrence of `sep`. Empty input yields no
/// parts (an empty tag segment means zero tag pairs, not one empty pair).
fn split_all_unescaped(s: &str, sep: char) -> Vec<&str> {
    if s.is_empty() {
        return Vec::new();
    }
    let positions = unescaped_positions(s, sep);
    let mut parts = Vec::with_capacity(positions.len() + 1);
    let mut start = 0;
    for pos in positions {
        parts.push(&s[start..pos]);
        start = pos + sep.len_utf8();
    }
    parts.push(&s[start..]);
    parts
}

fn encode_tags(tags: &Tags) -> String {
    tags.iter()
        .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
        .collect::<Vec<_>>()
        .join(";")
}

fn decode_tags(s: &str) -> Tags {
    let mut tags = Tags::new();
    for pair in split_all_unescaped(s, ';') {
        if let Some(kv) = split_first_n_unescaped(pair, '=', 1) {
            tags.insert(unescape(kv[0]), unescape(kv[1]));
        }
        // A pair lacking an equals is silently dropped.
    }
    tags
}

/// Encode one observation as a WAL line, including the trailing newline.
pub fn encode(dp: &DataPoint) -> String {
    format!(
        "{},{},{},{}\n",
        dp.timestamp,
        escape(&dp.metric),
        dp.value,
        encode_tags(&dp.tags)
    )
}

/// Parse one WAL line (without its trailing newline) into an observation.
pub fn decode(line: &str) -> Result<DataPoint, ParseError> {
    let parts =
        split_first_n_unescaped(line, ',', 3).ok_or_else(|| parse_error("expected 4 comma-separated fields"))?;
    let timestamp: Timestamp = parts[0]
        .parse()
        .map_err(|_| parse_error("timestamp is not an integer"))?;
    let metric = unescape(parts[1]);
    if metric.is_empty() {
        return Err(parse_error("metric must not be empty"));
    }
    let value: f64 = parts[2]
        .parse()
        .map_err(|_| parse_error("value is not a decimal float"))?;
    let tags = decode_tags(parts[3]);
    Ok(DataPoint::new(timestamp, metric, value, tags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trip_basic() {
        let mut tags = Tags::new();
        tags.insert("host".into(), "server1".into());
        let dp = DataPoint::new(1_700_000_000_000, "cpu.usage", 45.2, tags);
        let line = encode(&dp);
        let decoded = decode(line.trim_end_matches('\n')).unwrap();
        assert_eq!(dp, decoded);
    }

    #[test]
    fn round_trip_empty_tags() {
        let dp = DataPoint::new(0, "metric", -3.1e4, Tags::new());
        let line = encode(&dp);
        let decoded = decode(line.trim_end_matches('\n')).unwrap();
        assert_eq!(dp, decoded);
    }

    #[test]
    fn round_trip_nan() {
        let dp = DataPoint::new(5, "m", f64::NAN, Tags::new());
        let line = encode(&dp);
        let decoded = decode(line.trim_end_matches('\n')).unwrap();
        assert!(decoded.value.is_nan());
    }

    #[test]
    fn escapes_special_characters_in_metric_and_tags() {
        let mut tags = Tags::new();
        tags.insert("weird,key;with=stuff".into(), "val\\ue".into());
        let dp = DataPoint::new(1, "metric,with;special=chars\\", 1.0, tags);
        let line = encode(&dp);
        let decoded = decode(line.trim_end_matches('\n')).unwrap();
        assert_eq!(dp, decoded);
    }

    #[test]
    fn tag_pair_without_equals_is_dropped() {
        let decoded = decode("1,cpu,1.0,host=s1;malformed;dc=west").unwrap();
        assert_eq!(decoded.tags.len(), 2);
        assert_eq!(decoded.tags.get("host"), Some(&"s1".to_string()));
        assert_eq!(decoded.tags.get("dc"), Some(&"west".to_string()));
    }

    #[test]
    fn unknown_escape_sequence_degrades_to_literal() {
        // \n here is an escape of the letter n, not a newline control code.
        let decoded = decode("1,cpu,1.0,host=s\\1").unwrap();
        assert_eq!(decoded.tags.get("host"), Some(&"s1".to_string()));
    }

    #[test]
    fn too_few_fields_is_an_error() {
        assert!(decode("1,cpu,1.0").is_err());
    }

    #[test]
    fn empty_metric_is_an_error() {
        assert!(decode("1,,1.0,").is_err());
    }

    #[test]
    fn non_numeric_timestamp_is_an_error() {
        assert!(decode("not-a-number,cpu,1.0,").is_err());
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary_strings(
            metric in "[^\n]{1,20}",
            key in "[^\n]{0,10}",
            val in "[^\n]{0,10}",
            value in -1e6f64..1e6f64,
            ts in 0i64..i64::MAX / 2,
        ) {
            prop_assume!(!metric.is_empty());
            let mut tags = Tags::new();
            if !key.is_empty() {
                tags.insert(key, val);
            }
            let dp = DataPoint::new(ts, metric, value, tags);
            let line = encode(&dp);
            let decoded = decode(line.trim_end_matches('\n')).unwrap();
            prop_assert_eq!(dp, decoded);
        }
    }
}
