//! The timeout-plus-backoff prevention scenario: reuses the Deadlock scenario's
//! alternating acquisition orders but substitutes the Retry protocol, so no
//! watchdog is needed — a stuck worker simply backs off and tries again.
//!
//! Ported from `core/scenario.py::RetryScenario`.

use std::sync::Arc;
use std::thread;

use dlab_core::ResourceCell;
use dlab_metrics::MetricsCollector;
use dlab_workers::RetryWorker;

use crate::config::ScenarioConfig;
use crate::labels::generate_labels;
use crate::outcome::ScenarioOutcome;

pub const TITLE: &str = "Scenario 3: Retry with backoff";

pub fn run(config: &ScenarioConfig) -> ScenarioOutcome {
    let labels = generate_labels(config.resources);
    let cells: Vec<Arc<ResourceCell>> = labels.iter().map(|l| Arc::new(ResourceCell::new(l.clone()))).collect();
    println!(
        "[parent] resources: {}",
        labels.iter().map(|l| format!("{l}=1")).collect::<Vec<_>>().join(", ")
    );

    let (reporter, collector) = MetricsCollector::new();
    let handles: Vec<_> = (0..config.workers)
        .map(|idx| {
            let order: Vec<usize> = if idx % 2 == 0 {
                (0..cells.len()).collect()
            } else {
                (0..cells.len()).rev().collect()
            };
            let ordered: Vec<(Arc<ResourceCell>, String)> = order
                .iter()
                .map(|&i| (Arc::clone(&cells[i]), labels[i].clone()))
                .collect();
            let worker = RetryWorker::new(format!("P{}", idx + 1), ordered, config.hold_time, config.try_timeout);
            let reporter = reporter.clone();
            thread::spawn(move || worker.run(&reporter, TITLE))
        })
        .collect();

    crate::join::join_all(handles);

    println!("[parent] timeouts avoided deadlock even with reversed acquisition order.");
    let outcome = ScenarioOutcome::new(TITLE, collector.drain(), config.workers);
    outcome.log_summary();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // two workers, two resources, opposite orders — both finish ok, at least one retries.
    #[test]
    fn opposing_orders_finish_ok_with_at_least_one_retry() {
        let config = ScenarioConfig {
            workers: 2,
            resources: 2,
            resource_units: 1,
            hold_time: Duration::from_millis(40),
            timeout: Duration::from_secs(5),
            try_timeout: Duration::from_millis(15),
        };
        let outcome = run(&config);
        assert_eq!(outcome.summary.records_received, 2);
        assert_eq!(outcome.summary.ok_count, 2);
        assert!(outcome.summary.total_retries >= 1);
    }

    // every worker eventually finishes ok, however many retries it takes.
    #[test]
    fn four_workers_all_finish_ok_eventually() {
        let config = ScenarioConfig {
            workers: 4,
            resources: 2,
            resource_units: 1,
            hold_time: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
            try_timeout: Duration::from_millis(8),
        };
        let outcome = run(&config);
        assert_eq!(outcome.summary.records_received, 4);
        assert_eq!(outcome.summary.ok_count, 4);
    }
}
