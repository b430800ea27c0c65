//! Data model for the discrete-time simulator's `Process`/`Resource` types.
//!
//! These types are also reused wherever a plain "who holds what" model is handy; the
//! lock-based scenarios (C5) have their own `ResourceCell` instead since they only ever
//! track binary possession, not a plan of future requests.

use std::collections::BTreeSet;

/// Lifecycle state of a simulated process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Blocked,
    Deadlocked,
    Finished,
}

impl ProcessState {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessState::Running => "RUNNING",
            ProcessState::Blocked => "BLOCKED",
            ProcessState::Deadlocked => "DEADLOCKED",
            ProcessState::Finished => "FINISHED",
        }
    }
}

/// A simulated process: an identifier, an ordered acquisition plan, and current state.
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: String,
    pub plan: Vec<String>,
    pub held: BTreeSet<String>,
    pub current_request: Option<String>,
    pub state: ProcessState,
}

impl Process {
    pub fn new(pid: impl Into<String>, plan: Vec<String>) -> Self {
        Self {
            pid: pid.into(),
            plan,
            held: BTreeSet::new(),
            current_request: None,
            state: ProcessState::Running,
        }
    }

    /// Picks the next resource to request, or `None` if the plan is fully satisfied.
    ///
    /// In `ordered` mode this is the lexicographically smallest unheld plan entry; in
    /// `naive` mode it is the first unheld entry in declared plan order. These coincide
    /// only when the plan happens to already be sorted, which is why both branches are
    /// kept explicit rather than collapsed into one.
    pub fn next_request(&self, ordered_mode: bool) -> Option<String> {
        if !matches!(self.state, ProcessState::Running) {
            return None;
        }
        if ordered_mode {
            self.plan
                .iter()
                .filter(|r| !self.held.contains(*r))
                .min()
                .cloned()
        } else {
            self.plan.iter().find(|r| !self.held.contains(*r)).cloned()
        }
    }

    pub fn has_all_resources(&self) -> bool {
        self.plan.iter().all(|r| self.held.contains(r))
    }

    pub fn mark_blocked(&mut self, resource_id: impl Into<String>) {
        self.state = ProcessState::Blocked;
        self.current_request = Some(resource_id.into());
    }

    pub fn mark_deadlocked(&mut self) {
        self.state = ProcessState::Deadlocked;
    }

    pub fn mark_finished(&mut self) {
        self.held.clear();
        self.current_request = None;
        self.state = ProcessState::Finished;
    }
}

/// A simulated resource: an identifier and at most one holder.
#[derive(Debug, Clone)]
pub struct Resource {
    pub rid: String,
    pub held_by: Option<String>,
}

impl Resource {
    pub fn new(rid: impl Into<String>) -> Self {
        Self {
            rid: rid.into(),
            held_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_next_request_respects_plan_order() {
        let p = Process::new("P1", vec!["R2".into(), "R1".into()]);
        assert_eq!(p.next_request(false).as_deref(), Some("R2"));
        assert_eq!(p.next_request(true).as_deref(), Some("R1"));
    }

    #[test]
    fn next_request_skips_held_entries() {
        let mut p = Process::new("P1", vec!["R1".into(), "R2".into()]);
        p.held.insert("R1".into());
        assert_eq!(p.next_request(false).as_deref(), Some("R2"));
        assert_eq!(p.next_request(true).as_deref(), Some("R2"));
    }

    #[test]
    fn finished_plan_yields_no_request() {
        let mut p = Process::new("P1", vec!["R1".into()]);
        p.held.insert("R1".into());
        assert!(p.next_request(false).is_none());
        assert!(p.has_all_resources());
    }
}
