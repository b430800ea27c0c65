//! The fixed-ordering prevention scenario: every worker acquires resources
//! in the same ascending order, so a circular wait can never form.
//!
//! Ported from `core/scenario.py::OrderedScenario`.

use std::sync::Arc;
use std::thread;

use dlab_core::ResourceCell;
use dlab_metrics::MetricsCollector;
use dlab_workers::NaiveWorker;

use crate::config::ScenarioConfig;
use crate::labels::generate_labels;
use crate::outcome::ScenarioOutcome;

pub const TITLE: &str = "Scenario 2: Ordered acquisition";

pub fn run(config: &ScenarioConfig) -> ScenarioOutcome {
    let labels = generate_labels(config.resources);
    let cells: Vec<Arc<ResourceCell>> = labels.iter().map(|l| Arc::new(ResourceCell::new(l.clone()))).collect();
    println!(
        "[parent] resources: {}",
        labels.iter().map(|l| format!("{l}=1")).collect::<Vec<_>>().join(", ")
    );

    let ordered: Vec<(Arc<ResourceCell>, String)> = cells
        .iter()
        .zip(&labels)
        .map(|(cell, label)| (Arc::clone(cell), label.clone()))
        .collect();

    let (reporter, collector) = MetricsCollector::new();
    let handles: Vec<_> = (0..config.workers)
        .map(|idx| {
            let worker = NaiveWorker::new(format!("P{}", idx + 1), ordered.clone(), config.hold_time);
            let reporter = reporter.clone();
            thread::spawn(move || worker.run(&reporter, TITLE))
        })
        .collect();

    crate::join::join_all(handles);

    println!("[parent] every worker obeyed the same resource order and finished without deadlock.");
    let outcome = ScenarioOutcome::new(TITLE, collector.drain(), config.workers);
    outcome.log_summary();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // the ordered scenario finishes without any watchdog intervention, for any N, M.
    #[test]
    fn every_worker_finishes_ok_regardless_of_worker_count() {
        let config = ScenarioConfig {
            workers: 5,
            resources: 3,
            resource_units: 1,
            hold_time: Duration::from_millis(2),
            timeout: Duration::from_secs(5),
            try_timeout: Duration::from_millis(10),
        };
        let outcome = run(&config);
        assert_eq!(outcome.summary.records_received, 5);
        assert_eq!(outcome.summary.ok_count, 5);
        assert_eq!(outcome.summary.error_count, 0);
    }
}
