//! The result a scenario runner hands back to its caller.

use dlab_metrics::{MetricRecord, ScenarioSummary};
use tracing::info;

/// Everything a scenario produced: the tagged per-worker records and the aggregate
/// summary computed over them.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub title: String,
    pub summary: ScenarioSummary,
    pub records: Vec<MetricRecord>,
}

impl ScenarioOutcome {
    pub fn new(title: impl Into<String>, records: Vec<MetricRecord>, total_workers_expected: usize) -> Self {
        let title = title.into();
        let (records, summary) = dlab_metrics::summarize(&title, total_workers_expected, records);
        Self { title, summary, records }
    }

    /// Human-facing recap, the Rust analogue of the source's end-of-scenario prints.
    pub fn log_summary(&self) {
        info!(
            scenario = %self.title,
            expected = self.summary.total_workers_expected,
            received = self.summary.records_received,
            ok = self.summary.ok_count,
            errors = self.summary.error_count,
            retries = self.summary.total_retries,
            mean_wait = self.summary.mean_wait_time,
            "scenario finished"
        );
        println!(
            "{}: {}/{} workers reported in ({} ok, {} errors, {} total retries, mean wait {:.3}s)",
            self.title,
            self.summary.records_received,
            self.summary.total_workers_expected,
            self.summary.ok_count,
            self.summary.error_count,
            self.summary.total_retries,
            self.summary.mean_wait_time,
        );
        if self.summary.records_received < self.summary.total_workers_expected {
            println!(
                "  ({} worker(s) never reported in — presumed stuck in deadlock)",
                self.summary.total_workers_expected - self.summary.records_received
            );
        }
    }
}
