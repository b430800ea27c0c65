//! The concurrent-safe metrics queue and summariser.
//!
//! The send side is non-blocking and total for any worker still alive; the receive
//! side only drains after every worker has joined (or been abandoned as stuck), so it
//! sees every record that was ever sent — never more, never a partial read.

use crossbeam_channel::{Receiver, Sender};

use crate::record::{MetricRecord, MetricStatus};

/// Handle a worker uses to publish its terminal record. Cloning is cheap; every
/// worker gets its own clone so the collector doesn't need to outlive any one of them.
#[derive(Clone)]
pub struct MetricsReporter {
    sender: Sender<MetricRecord>,
}

impl MetricsReporter {
    pub fn send(&self, record: MetricRecord) {
        // A full invocation never outlives its receiver, so a send error here would
        // only mean the collector was dropped early — nothing a worker can act on.
        let _ = self.sender.send(record);
    }
}

/// The scenario-side handle: owns the receiver and drains it after every worker has
/// terminated (or been abandoned, per the Deadlock scenario's watchdog).
pub struct MetricsCollector {
    receiver: Receiver<MetricRecord>,
}

impl MetricsCollector {
    pub fn new() -> (MetricsReporter, MetricsCollector) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (MetricsReporter { sender }, MetricsCollector { receiver })
    }

    /// Drains every record currently queued. Must be called after all workers have
    /// joined (or been abandoned) — records from a still-running worker are simply not
    /// there yet, which is why this is a one-shot drain, not a blocking `recv` loop.
    pub fn drain(&self) -> Vec<MetricRecord> {
        self.receiver.try_iter().collect()
    }
}

/// Aggregate outcome of a scenario run, computed from whatever records were received —
/// a force-terminated worker's missing record simply does not contribute.
#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub total_workers_expected: usize,
    pub records_received: usize,
    pub ok_count: usize,
    pub error_count: usize,
    pub mean_duration: Option<f64>,
    pub mean_wait_time: f64,
    pub total_retries: u32,
}

/// Tags every record with `scenario`'s title and computes the summary.
pub fn summarize(
    scenario: &str,
    total_workers_expected: usize,
    mut records: Vec<MetricRecord>,
) -> (Vec<MetricRecord>, ScenarioSummary) {
    for record in &mut records {
        record.scenario = scenario.to_string();
        record.scenario_tag = scenario
            .split_once(':')
            .map(|(tag, _)| tag.trim().to_string())
            .unwrap_or_else(|| scenario.to_string());
    }

    let ok_count = records.iter().filter(|r| r.status == MetricStatus::Ok).count();
    let error_count = records.iter().filter(|r| r.status == MetricStatus::Error).count();
    let total_retries: u32 = records.iter().map(|r| r.retries).sum();

    let durations: Vec<f64> = records.iter().filter_map(|r| r.duration).collect();
    let mean_duration = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    };

    let mean_wait_time = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.wait_time).sum::<f64>() / records.len() as f64
    };

    let summary = ScenarioSummary {
        scenario: scenario.to_string(),
        total_workers_expected,
        records_received: records.len(),
        ok_count,
        error_count,
        mean_duration,
        mean_wait_time,
        total_retries,
    };

    (records, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, status: MetricStatus, duration: Option<f64>, wait: f64) -> MetricRecord {
        MetricRecord::new(name, status, 0, duration, wait, "Untagged")
    }

    #[test]
    fn collector_receives_every_sent_record() {
        let (reporter, collector) = MetricsCollector::new();
        reporter.send(record("P1", MetricStatus::Ok, Some(1.0), 0.1));
        reporter.send(record("P2", MetricStatus::Ok, Some(2.0), 0.2));

        let drained = collector.drain();
        assert_eq!(drained.len(), 2);
    }

    // every metric record corresponds to a distinct worker name within a scenario.
    #[test]
    fn summary_tolerates_fewer_records_than_expected_workers() {
        let records = vec![record("P1", MetricStatus::Ok, Some(1.0), 0.1)];
        let (tagged, summary) = summarize("Scenario 1: Deadlock", 3, records);
        assert_eq!(summary.records_received, 1);
        assert_eq!(summary.total_workers_expected, 3);
        assert_eq!(tagged[0].scenario_tag, "Scenario 1");
    }

    #[test]
    fn summary_computes_means_and_counts() {
        let records = vec![
            record("P1", MetricStatus::Ok, Some(1.0), 0.5),
            record("P2", MetricStatus::Error, None, 0.3),
        ];
        let (_, summary) = summarize("Solo", 2, records);
        assert_eq!(summary.ok_count, 1);
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.mean_duration, Some(1.0));
        assert!((summary.mean_wait_time - 0.4).abs() < 1e-9);
    }
}
