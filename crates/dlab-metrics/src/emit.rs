//! Writing the aggregated metric records to disk.
//!
//! I/O failures here are reported to the operator but never retroactively fail the
//! scenario that produced the records — callers get an error back and decide
//! for themselves whether that's fatal to the overall invocation.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::record::MetricRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsFormat {
    Json,
    Csv,
}

impl std::str::FromStr for MetricsFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(MetricsFormat::Json),
            "csv" => Ok(MetricsFormat::Csv),
            other => Err(format!("unknown metrics format '{other}', expected 'json' or 'csv'")),
        }
    }
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to serialise metrics as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write CSV metrics: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error writing metrics file: {0}")]
    Io(#[from] std::io::Error),
}

/// A flattened row matching the fixed CSV header order:
/// name, status, retries, duration, wait_time, scenario, cenario.
#[derive(Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    status: &'a str,
    retries: u32,
    duration: Option<f64>,
    wait_time: f64,
    scenario: &'a str,
    cenario: &'a str,
}

/// Writes `records` to `path` in the given format. JSON is a flat array; CSV has a
/// header row listing the same keys in the given order.
pub fn write_metrics(
    path: &Path,
    format: MetricsFormat,
    records: &[MetricRecord],
) -> Result<(), EmitError> {
    match format {
        MetricsFormat::Json => {
            let json = serde_json::to_string_pretty(records)?;
            std::fs::write(path, json)?;
        }
        MetricsFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)?;
            for record in records {
                writer.serialize(CsvRow {
                    name: &record.name,
                    status: record.status.as_str(),
                    retries: record.retries,
                    duration: record.duration,
                    wait_time: record.wait_time,
                    scenario: &record.scenario,
                    cenario: &record.scenario_tag,
                })?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MetricStatus;

    fn sample_records() -> Vec<MetricRecord> {
        vec![
            MetricRecord::new("P1", MetricStatus::Ok, 0, Some(1.234), 0.1, "Scenario 1: Deadlock"),
            MetricRecord::new("P2", MetricStatus::Error, 3, None, 0.2, "Scenario 1: Deadlock"),
        ]
    }

    #[test]
    fn json_round_trips_as_a_flat_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        write_metrics(&path, MetricsFormat::Json, &sample_records()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["name"], "P1");
        assert_eq!(parsed[1]["duration"], serde_json::Value::Null);
    }

    #[test]
    fn csv_header_matches_the_documented_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        write_metrics(&path, MetricsFormat::Csv, &sample_records()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(header, "name,status,retries,duration,wait_time,scenario,cenario");
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn format_parses_from_cli_strings() {
        assert_eq!("json".parse::<MetricsFormat>().unwrap(), MetricsFormat::Json);
        assert_eq!("csv".parse::<MetricsFormat>().unwrap(), MetricsFormat::Csv);
        assert!("xml".parse::<MetricsFormat>().is_err());
    }
}
