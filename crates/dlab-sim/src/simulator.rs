//! The discrete-time step loop, ported from
//! `fs_deadlock_sim/simulator.py::Simulator`.
//!
//! Single-threaded and logically clocked: one virtual tick advances every
//! non-terminal process once, then the wait-for detector runs once over the
//! resulting state. No real concurrency is involved — the whole model runs
//! on the calling thread.

use std::collections::HashMap;

use dlab_core::{Process, ProcessState, Resource, WaitForGraph};
use tracing::info;

use crate::lock_manager::LockManager;

/// Selects which of `Process::next_request`'s two branches the step loop uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    Naive,
    Ordered,
}

impl SimMode {
    fn is_ordered(self) -> bool {
        matches!(self, SimMode::Ordered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SimMode::Naive => "naive",
            SimMode::Ordered => "ordered",
        }
    }
}

impl std::str::FromStr for SimMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(SimMode::Naive),
            "ordered" => Ok(SimMode::Ordered),
            other => Err(format!("unknown simulator mode '{other}', expected 'naive' or 'ordered'")),
        }
    }
}

/// Outcome of a full `Simulator::run`: whether a deadlock was found, the step
/// it was found at (if any), and the final per-process states for reporting.
#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub deadlock_found: bool,
    pub deadlock_step: Option<u64>,
    pub cycle: Vec<String>,
    pub steps_run: u64,
    pub final_states: Vec<(String, ProcessState)>,
}

pub struct Simulator {
    processes: Vec<Process>,
    resources: HashMap<String, Resource>,
    mode: SimMode,
    max_steps: u64,
}

impl Simulator {
    pub fn new(processes: Vec<Process>, resources: Vec<Resource>, mode: SimMode, max_steps: u64) -> Self {
        Self {
            processes,
            resources: resources.into_iter().map(|r| (r.rid.clone(), r)).collect(),
            mode,
            max_steps,
        }
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Runs the step loop to completion: deadlock detected, every process
    /// FINISHED, or `max_steps` reached.
    pub fn run(mut self) -> SimOutcome {
        println!(
            "Running simulation with {} processes and {} resources in mode '{}'",
            self.processes.len(),
            self.resources.len(),
            self.mode.as_str()
        );

        let mut lock_manager = LockManager::new(std::mem::take(&mut self.resources));
        let mut deadlock_step = None;
        let mut cycle = Vec::new();
        let mut steps_run = 0;

        for t in 0..self.max_steps {
            steps_run = t + 1;
            let (deadlock_found, found_cycle) = self.step(&mut lock_manager, t);
            if deadlock_found {
                deadlock_step = Some(t);
                cycle = found_cycle;
                break;
            }
            if self.processes.iter().all(|p| p.state == ProcessState::Finished) {
                println!("All processes finished by t={t}");
                break;
            }
        }

        let final_states = self.processes.iter().map(|p| (p.pid.clone(), p.state)).collect();
        SimOutcome {
            deadlock_found: deadlock_step.is_some(),
            deadlock_step,
            cycle,
            steps_run,
            final_states,
        }
    }

    /// Advances one tick: request-or-progress sweep, completion sweep, then a
    /// single deadlock check over the resulting state. Returns `(deadlock_found,
    /// cycle)`.
    fn step(&mut self, lock_manager: &mut LockManager, t: u64) -> (bool, Vec<String>) {
        for idx in 0..self.processes.len() {
            let state = self.processes[idx].state;
            match state {
                ProcessState::Deadlocked | ProcessState::Finished => continue,
                ProcessState::Blocked => {
                    if let Some(request) = self.processes[idx].current_request.clone() {
                        lock_manager.request(&mut self.processes[idx], &request, t);
                    }
                }
                ProcessState::Running => {
                    if self.processes[idx].has_all_resources() {
                        self.complete_process(idx, lock_manager, t);
                        continue;
                    }
                    if let Some(target) = self.processes[idx].next_request(self.mode.is_ordered()) {
                        lock_manager.request(&mut self.processes[idx], &target, t);
                    }
                }
            }
        }

        // Second sweep: a process whose acquisition attempt above completed its
        // plan is finished now, not next tick.
        for idx in 0..self.processes.len() {
            if self.processes[idx].state == ProcessState::Running && self.processes[idx].has_all_resources() {
                self.complete_process(idx, lock_manager, t);
            }
        }

        let graph = self.build_wait_for_graph(lock_manager);
        let (has_deadlock, edges, cycle) = graph.detect();
        self.print_state_table(t);

        if has_deadlock {
            println!("*** Deadlock detected at t={t} ***");
            self.print_wait_for_graph(&edges, &cycle);
            for process in &mut self.processes {
                if cycle.contains(&process.pid) {
                    process.mark_deadlocked();
                }
            }
            info!(t, cycle = ?cycle, "deadlock detected");
        }

        (has_deadlock, cycle)
    }

    fn complete_process(&mut self, idx: usize, lock_manager: &mut LockManager, t: u64) {
        let pid = self.processes[idx].pid.clone();
        println!("[t={t}] {pid} completed its work; releasing resources");
        lock_manager.release_all(&mut self.processes[idx], t);
    }

    /// Builds the wait-for graph: one edge per BLOCKED process with
    /// a pending request whose holder is someone else.
    fn build_wait_for_graph(&self, lock_manager: &LockManager) -> WaitForGraph {
        let mut graph = WaitForGraph::new();
        for process in &self.processes {
            if process.state != ProcessState::Blocked {
                continue;
            }
            let Some(request) = &process.current_request else { continue };
            let Some(resource) = lock_manager.resources().get(request) else { continue };
            if let Some(holder) = &resource.held_by {
                graph.add_edge(process.pid.clone(), holder.clone());
            }
        }
        graph
    }

    fn print_wait_for_graph(&self, edges: &[(String, String)], cycle: &[String]) {
        println!("Wait-for graph:");
        if edges.is_empty() {
            println!("  (no edges)");
        } else {
            for (p, q) in edges {
                println!("  {p} -> {q}");
            }
        }
        if !cycle.is_empty() {
            println!("  cycle detected: {}", cycle.join(" -> "));
        }
    }

    /// Prints the state table: `t | pid | held | requested | state`.
    fn print_state_table(&self, t: u64) {
        println!("State table:");
        println!("  t  | pid | held         | requested   | state");
        for process in &self.processes {
            let held = if process.held.is_empty() {
                "-".to_string()
            } else {
                process.held.iter().cloned().collect::<Vec<_>>().join(",")
            };
            let requested = process.current_request.as_deref().unwrap_or("-");
            println!(
                "  {t:02} | {:>3} | {held:>11} | {requested:>11} | {}",
                process.pid,
                process.state.as_str()
            );
        }
        println!("-");
    }
}
