//! CSV bulk loader.

use std::path::Path;

use tracing::warn;
use tsdb_core::{DataPoint, Tags};
use tsdb_engine::{time::now_millis, Store};

/// Outcome counts from one [`run`] call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoadReport {
    pub inserted: usize,
    pub too_old: usize,
    pub malformed: usize,
}

/// Load `csv_path` into `store`, bypassing the WAL (the CSV file is its
/// own durability record). The first three columns are timestamp, metric,
/// value; every other column is a tag, named by its header.
pub fn run(store: &Store, csv_path: &Path) -> csv::Result<LoadReport> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(csv_path)?;
    let headers = reader.headers()?.clone();
    let tag_names: Vec<String> = headers.iter().skip(3).map(str::to_string).collect();
    let cutoff = now_millis() - store.retention().as_millis() as i64;

    let mut report = LoadReport::default();
    for (lineno, record) in reader.records().enumerate() {
        let record = record?;
        match parse_row(&record, &tag_names) {
            Some((timestamp, metric, value, tags)) => {
                if timestamp < cutoff {
                    report.too_old += 1;
                    continue;
                }
                store.insert_without_log(DataPoint::new(timestamp, metric, value, tags));
                report.inserted += 1;
            }
            None => {
                warn!(line = lineno + 2, "skipping malformed CSV row");
                report.malformed += 1;
            }
        }
    }
    Ok(report)
}

fn parse_row(record: &csv::StringRecord, tag_names: &[String]) -> Option<(i64, String, f64, Tags)> {
    if record.len() < 3 {
        return None;
    }
    let timestamp: i64 = record.get(0)?.trim().parse().ok()?;
    let metric = record.get(1)?.trim().to_string();
    if metric.is_empty() {
        return None;
    }
    let value: f64 = record.get(2)?.trim().parse().ok()?;

    let mut tags = Tags::new();
    for (name, cell) in tag_names.iter().zip(record.iter().skip(3)) {
        if !cell.is_empty() {
            tags.insert(name.clone(), cell.to_string());
        }
    }

    Some((timestamp, metric, value, tags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use tsdb_engine::StoreConfig;

    fn store_in(dir: &TempDir) -> Store {
        let store = Store::new(StoreConfig::new(dir.path()));
        store.initialize();
        store
    }

    #[test]
    fn loads_rows_with_tag_columns() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let csv_dir = TempDir::new().unwrap();
        let csv_path = csv_dir.path().join("in.csv");
        let mut f = std::fs::File::create(&csv_path).unwrap();
        writeln!(f, "timestamp,metric,value,host,dc").unwrap();
        writeln!(f, "{},cpu.usage,45.2,server1,west", now_millis()).unwrap();
        writeln!(f, "{},cpu.usage,12.0,server2,", now_millis()).unwrap();
        drop(f);

        let report = run(&store, &csv_path).unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.malformed, 0);

        let results = store.query("cpu.usage", 0, now_millis() + 1, None);
        assert_eq!(results.len(), 2);

        store.shutdown();
    }

    #[test]
    fn skips_malformed_and_too_old_rows() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let csv_dir = TempDir::new().unwrap();
        let csv_path = csv_dir.path().join("in.csv");
        let mut f = std::fs::File::create(&csv_path).unwrap();
        writeln!(f, "timestamp,metric,value").unwrap();
        writeln!(f, "not-a-number,cpu.usage,1.0").unwrap();
        writeln!(f, "0,cpu.usage,1.0").unwrap(); // epoch 0, far older than retention
        writeln!(f, "{},cpu.usage,2.0", now_millis()).unwrap();
        drop(f);

        let report = run(&store, &csv_path).unwrap();
        assert_eq!(report.malformed, 1);
        assert_eq!(report.too_old, 1);
        assert_eq!(report.inserted, 1);

        store.shutdown();
    }
}
