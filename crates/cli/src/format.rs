//! Human- and JSON-mode rendering of command output.

use tsdb_core::DataPoint;

use crate::load::LoadReport;
use crate::wal_info::WalInfoReport;

pub fn load_report(report: &LoadReport, json: bool) -> String {
    if json {
        serde_json::json!({
            "inserted": report.inserted,
            "too_old": report.too_old,
            "malformed": report.malformed,
        })
        .to_string()
    } else {
        format!(
            "inserted {} observation(s), skipped {} too old, skipped {} malformed",
            report.inserted, report.too_old, report.malformed
        )
    }
}

pub fn query_results(points: &[DataPoint], json: bool) -> String {
    if json {
        let rows: Vec<_> = points
            .iter()
            .map(|dp| {
                serde_json::json!({
                    "timestamp": dp.timestamp,
                    "metric": dp.metric,
                    "value": dp.value,
                    "tags": dp.tags,
                })
            })
            .collect();
        serde_json::Value::Array(rows).to_string()
    } else if points.is_empty() {
        "(no observations)".to_string()
    } else {
        points
            .iter()
            .map(|dp| {
                let tags = dp
                    .tags
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}\t{}\t{}\t{{{}}}", dp.timestamp, dp.metric, dp.value, tags)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn wal_info(report: &WalInfoReport, json: bool) -> String {
    if json {
        serde_json::json!({
            "active": report.active.as_ref().map(|s| serde_json::json!({"name": s.name, "bytes": s.bytes})),
            "rotated": report.rotated.iter().map(|s| serde_json::json!({"name": s.name, "bytes": s.bytes})).collect::<Vec<_>>(),
        })
        .to_string()
    } else {
        let mut lines = Vec::new();
        match &report.active {
            Some(active) => lines.push(format!("active:  {} ({} bytes)", active.name, active.bytes)),
            None => lines.push("active:  (none)".to_string()),
        }
        if report.rotated.is_empty() {
            lines.push("rotated: (none)".to_string());
        } else {
            for segment in &report.rotated {
                lines.push(format!("rotated: {} ({} bytes)", segment.name, segment.bytes));
            }
        }
        lines.join("\n")
    }
}
