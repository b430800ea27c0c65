//! Exclusive resource ownership for the discrete-time simulator.
//!
//! Distinct from `dlab_core::resource::ResourceCell`: nothing here blocks. A denied
//! request just marks the process `Blocked` and returns, leaving the scheduling to the
//! simulator's step loop.

use std::collections::HashMap;

use dlab_core::{Process, ProcessState, Resource};
use tracing::info;

pub struct LockManager {
    resources: HashMap<String, Resource>,
}

impl LockManager {
    pub fn new(resources: HashMap<String, Resource>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &HashMap<String, Resource> {
        &self.resources
    }

    /// Attempts to grant `resource_id` to `process` at step `t`. Returns `true` iff the
    /// process now holds it (either freshly granted or already held).
    pub fn request(&mut self, process: &mut Process, resource_id: &str, t: u64) -> bool {
        let resource = self
            .resources
            .get_mut(resource_id)
            .unwrap_or_else(|| panic!("unknown resource id {resource_id}"));

        if resource.held_by.is_none() {
            resource.held_by = Some(process.pid.clone());
            process.held.insert(resource_id.to_string());
            process.current_request = None;
            // A process retrying a request from BLOCKED returns to RUNNING once
            // granted, mirroring `models.py::LockManager.request`'s explicit reset.
            process.state = ProcessState::Running;
            info!(t, pid = %process.pid, resource = %resource_id, "acquired");
            return true;
        }
        if resource.held_by.as_deref() == Some(process.pid.as_str()) {
            return true;
        }

        let holder = resource.held_by.clone();
        process.mark_blocked(resource_id);
        info!(t, pid = %process.pid, resource = %resource_id, held_by = ?holder, "blocked");
        false
    }

    /// Releases every resource `process` holds and marks it finished.
    pub fn release_all(&mut self, process: &mut Process, t: u64) {
        if !process.held.is_empty() {
            let held: Vec<&str> = process.held.iter().map(String::as_str).collect();
            info!(t, pid = %process.pid, held = ?held, "releasing");
        }
        for resource_id in process.held.clone() {
            if let Some(resource) = self.resources.get_mut(&resource_id) {
                if resource.held_by.as_deref() == Some(process.pid.as_str()) {
                    resource.held_by = None;
                }
            }
        }
        process.mark_finished();
    }
}
