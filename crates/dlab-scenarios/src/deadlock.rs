//! The provocation scenario: alternating acquisition orders so that an
//! even-indexed and an odd-indexed worker can hold-and-wait on each other in a cycle.
//!
//! Ported from `core/scenario.py::DeadlockScenario`. The one difference forced by
//! Rust's safety model is how a stuck worker is handled once the watchdog expires: see
//! [`crate::watchdog`].

use std::sync::Arc;
use std::thread;

use dlab_core::ResourceCell;
use dlab_metrics::MetricsCollector;
use dlab_workers::NaiveWorker;
use tracing::warn;

use crate::config::ScenarioConfig;
use crate::labels::generate_labels;
use crate::outcome::ScenarioOutcome;
use crate::watchdog::watchdog_pair;

pub const TITLE: &str = "Scenario 1: Deadlock";

pub fn run(config: &ScenarioConfig) -> ScenarioOutcome {
    let labels = generate_labels(config.resources);
    let cells: Vec<Arc<ResourceCell>> = labels.iter().map(|l| Arc::new(ResourceCell::new(l.clone()))).collect();
    println!(
        "[parent] resources: {}",
        labels.iter().map(|l| format!("{l}=1")).collect::<Vec<_>>().join(", ")
    );

    let (reporter, collector) = MetricsCollector::new();
    let mut handles = Vec::with_capacity(config.workers);

    for idx in 0..config.workers {
        let order: Vec<usize> = if idx % 2 == 0 {
            (0..cells.len()).collect()
        } else {
            (0..cells.len()).rev().collect()
        };
        let ordered: Vec<(Arc<ResourceCell>, String)> = order
            .iter()
            .map(|&i| (Arc::clone(&cells[i]), labels[i].clone()))
            .collect();

        let worker = NaiveWorker::new(format!("P{}", idx + 1), ordered, config.hold_time);
        let (signal, waiter) = watchdog_pair();
        let reporter = reporter.clone();
        let handle = thread::spawn(move || {
            worker.run(&reporter, TITLE);
            signal.mark_done();
        });
        handles.push((format!("P{}", idx + 1), handle, waiter));
    }

    let mut stuck_names = Vec::new();
    for (name, handle, waiter) in handles {
        if waiter.wait(config.timeout) {
            let _ = handle.join();
        } else {
            stuck_names.push(name);
            // No safe way to force-terminate another thread in Rust; the handle is
            // simply dropped and the thread is left to run down on its own.
            drop(handle);
        }
    }

    if !stuck_names.is_empty() {
        warn!(stuck = ?stuck_names, "deadlock detected: workers never reported in after the watchdog timeout");
        println!(
            "[parent] deadlock detected: {} still alive after {:?}, abandoning them.",
            stuck_names.join(", "),
            config.timeout
        );
    } else {
        println!("[parent] surprising — everyone finished (perhaps the environment is too fast).");
    }

    let outcome = ScenarioOutcome::new(TITLE, collector.drain(), config.workers);
    outcome.log_summary();
    outcome
}
