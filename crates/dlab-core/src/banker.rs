//! The Banker safety engine.
//!
//! A single [`parking_lot::Mutex`] serialises every read and write of the capacity,
//! allocation, and max-claim state. The safety test is the textbook
//! Banker's-algorithm completion-sequence search: candidates are scanned in ascending
//! `pid` order so that, among multiple valid completion sequences, the engine always
//! picks the same one — determinism matters more than which safe order is found.

use parking_lot::Mutex;

use crate::error::{DlabError, DlabResult};

#[derive(Debug, Clone)]
struct BankerState {
    capacity: Vec<u32>,
    allocation: Vec<Vec<u32>>,
    max_claim: Vec<Vec<u32>>,
}

/// An immutable snapshot of the Banker's state, safe to hand to a logger.
///
/// Deep-copied out of the critical section so a caller holding this can never
/// observe a torn or later-mutated view of the engine's internals.
#[derive(Debug, Clone)]
pub struct BankerSnapshot {
    pub allocation: Vec<Vec<u32>>,
    pub available: Vec<u32>,
    pub max_claim: Vec<Vec<u32>>,
}

/// The shared, thread-safe Banker's-algorithm allocator.
pub struct Banker {
    state: Mutex<BankerState>,
}

impl Banker {
    /// Builds a Banker over `capacity` resource classes and the given per-process
    /// maximum claims. `max_claim.len()` is the number of processes; every row must be
    /// the same length as `capacity`.
    ///
    /// Rejects any claim that asks for more of a resource class than the engine could
    /// ever grant — e.g. a degenerate `U = [1, 0]` capacity paired with a claim on
    /// the zero-unit class. Such a claim could never be satisfied, so its owning
    /// worker would retry forever; resolving the hazard here, at construction, means no
    /// worker protocol needs an outer retry cap to avoid that hang.
    pub fn new(capacity: Vec<u32>, max_claim: Vec<Vec<u32>>) -> DlabResult<Self> {
        let num_resources = capacity.len();
        for (pid, claim) in max_claim.iter().enumerate() {
            for (resource, &claimed) in claim.iter().enumerate() {
                if claimed > capacity[resource] {
                    return Err(DlabError::ClaimExceedsCapacity {
                        pid,
                        resource,
                        claimed,
                        capacity: capacity[resource],
                    });
                }
            }
        }
        let num_processes = max_claim.len();
        Ok(Self {
            state: Mutex::new(BankerState {
                capacity,
                allocation: vec![vec![0; num_resources]; num_processes],
                max_claim,
            }),
        })
    }

    /// Attempts to grant `req` to process `pid`. Returns `Ok(true)` if granted,
    /// `Ok(false)` if denied (not safe, or exceeds remaining need), and `Err` only for
    /// a programming error (bad `pid` or shape mismatch).
    pub fn request_resources(&self, pid: usize, req: &[u32]) -> DlabResult<bool> {
        let mut state = self.state.lock();
        let num_processes = state.max_claim.len();
        let num_resources = state.capacity.len();

        if pid >= num_processes {
            return Err(DlabError::IndexOutOfRange { index: pid, len: num_processes });
        }
        if req.len() != num_resources {
            return Err(DlabError::RequestShapeMismatch {
                expected: num_resources,
                actual: req.len(),
            });
        }

        // Precondition: the request may not exceed the process's remaining declared need.
        for r in 0..num_resources {
            let remaining_need = state.max_claim[pid][r] - state.allocation[pid][r];
            if req[r] > remaining_need {
                return Ok(false);
            }
        }

        // Tentative grant.
        let mut tentative_allocation = state.allocation.clone();
        for r in 0..num_resources {
            tentative_allocation[pid][r] += req[r];
        }
        let mut available = state.capacity.clone();
        for r in 0..num_resources {
            let column_sum: u32 = tentative_allocation.iter().map(|row| row[r]).sum();
            if column_sum > state.capacity[r] {
                return Ok(false);
            }
            available[r] -= column_sum;
        }

        if !Self::is_safe(&tentative_allocation, &state.max_claim, &available) {
            return Ok(false);
        }

        state.allocation = tentative_allocation;
        Ok(true)
    }

    /// Safety test: tries to build a completion sequence over `work = available`,
    /// scanning unfinished processes in ascending `pid` order each pass.
    fn is_safe(allocation: &[Vec<u32>], max_claim: &[Vec<u32>], available: &[u32]) -> bool {
        let num_processes = allocation.len();
        let num_resources = available.len();
        let mut work = available.to_vec();
        let mut finish = vec![false; num_processes];
        let mut progressed = true;

        while progressed {
            progressed = false;
            for pid in 0..num_processes {
                if finish[pid] {
                    continue;
                }
                let need: Vec<u32> = (0..num_resources)
                    .map(|r| max_claim[pid][r] - allocation[pid][r])
                    .collect();
                if (0..num_resources).all(|r| need[r] <= work[r]) {
                    for r in 0..num_resources {
                        work[r] += allocation[pid][r];
                    }
                    finish[pid] = true;
                    progressed = true;
                }
            }
        }

        finish.into_iter().all(|f| f)
    }

    /// Releases every unit `pid` currently holds and returns the released amounts.
    pub fn release_all(&self, pid: usize) -> DlabResult<Vec<u32>> {
        let mut state = self.state.lock();
        let num_processes = state.max_claim.len();
        if pid >= num_processes {
            return Err(DlabError::IndexOutOfRange { index: pid, len: num_processes });
        }
        let released = std::mem::replace(
            &mut state.allocation[pid],
            vec![0; state.capacity.len()],
        );
        Ok(released)
    }

    /// A deep-copied view of the engine's current state, safe to log or print.
    pub fn snapshot(&self) -> BankerSnapshot {
        let state = self.state.lock();
        let num_resources = state.capacity.len();
        let mut available = state.capacity.clone();
        for r in 0..num_resources {
            let column_sum: u32 = state.allocation.iter().map(|row| row[r]).sum();
            available[r] -= column_sum;
        }
        BankerSnapshot {
            allocation: state.allocation.clone(),
            available,
            max_claim: state.max_claim.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // U = [1,1], three processes each claiming [1,1]; all three can finish.
    #[test]
    fn three_processes_one_unit_each_all_finish() {
        let banker = Banker::new(vec![1, 1], vec![vec![1, 1]; 3]).unwrap();

        // Only one process can hold either unit at a time under these claims; granting
        // a full [1,1] to one process and then releasing unblocks the rest.
        assert!(banker.request_resources(0, &[1, 1]).unwrap());
        assert_eq!(banker.release_all(0).unwrap(), vec![1, 1]);
        assert!(banker.request_resources(1, &[1, 1]).unwrap());
        assert_eq!(banker.release_all(1).unwrap(), vec![1, 1]);
        assert!(banker.request_resources(2, &[1, 1]).unwrap());
        assert_eq!(banker.release_all(2).unwrap(), vec![1, 1]);
    }

    // a request of all zeros is always granted and leaves state unchanged.
    #[test]
    fn all_zero_request_is_always_granted_and_noop() {
        let banker = Banker::new(vec![1, 1], vec![vec![1, 1]; 2]).unwrap();
        let before = banker.snapshot().allocation;
        assert!(banker.request_resources(0, &[0, 0]).unwrap());
        assert_eq!(banker.snapshot().allocation, before);
    }

    // allocation never exceeds the declared claim.
    #[test]
    fn request_beyond_remaining_need_is_denied() {
        let banker = Banker::new(vec![5], vec![vec![2]]).unwrap();
        assert!(!banker.request_resources(0, &[3]).unwrap());
        assert!(banker.request_resources(0, &[2]).unwrap());
        assert!(!banker.request_resources(0, &[1]).unwrap());
    }

    // Denial of an unsafe request: classic textbook instance that fits within remaining
    // capacity but would leave both processes unable to ever reach their claim.
    #[test]
    fn unsafe_request_is_denied_even_with_capacity_available() {
        let banker = Banker::new(vec![10], vec![vec![9], vec![9]]).unwrap();
        assert!(banker.request_resources(0, &[5]).unwrap());
        // Granting 5 more to p1 would leave both processes needing 4 more out of 0
        // available: no completion sequence exists.
        assert!(!banker.request_resources(1, &[5]).unwrap());
        // A smaller, partial request from p1 keeps the state safe.
        assert!(banker.request_resources(1, &[1]).unwrap());
    }

    // Sigma_p A[p][r] <= U_r and V[r] >= 0 at every observation.
    #[test]
    fn allocation_never_exceeds_capacity() {
        let banker = Banker::new(vec![2], vec![vec![2], vec![2]]).unwrap();
        assert!(banker.request_resources(0, &[2]).unwrap());
        assert!(!banker.request_resources(1, &[1]).unwrap());
        let snapshot = banker.snapshot();
        assert!(snapshot.available.iter().all(|&v| v as i64 >= 0));
    }

    // after release_all(p), A[p] is zero and the returned vector equals pre-release A[p].
    #[test]
    fn release_all_zeroes_allocation_and_returns_prior_amounts() {
        let banker = Banker::new(vec![3], vec![vec![3]]).unwrap();
        assert!(banker.request_resources(0, &[3]).unwrap());
        let released = banker.release_all(0).unwrap();
        assert_eq!(released, vec![3]);
        assert_eq!(banker.snapshot().allocation[0], vec![0]);
    }

    #[test]
    fn out_of_range_pid_is_a_programming_error() {
        let banker = Banker::new(vec![1], vec![vec![1]]).unwrap();
        assert_eq!(
            banker.request_resources(5, &[1]),
            Err(DlabError::IndexOutOfRange { index: 5, len: 1 })
        );
    }

    // U = [1, 0], a claim requiring a unit of the zero-capacity class. Rejected at
    // construction rather than left to hang a worker in an unwinnable retry loop.
    #[test]
    fn a_claim_on_a_zero_capacity_class_is_rejected_at_construction() {
        let result = Banker::new(vec![1, 0], vec![vec![1, 1]]);
        assert_eq!(
            result.unwrap_err(),
            DlabError::ClaimExceedsCapacity { pid: 0, resource: 1, claimed: 1, capacity: 0 }
        );
    }

    // Banker safety is monotone in availability.
    #[test]
    fn safety_is_monotone_in_available_units() {
        let allocation = vec![vec![1, 0], vec![0, 1]];
        let max_claim = vec![vec![2, 0], vec![0, 2]];
        assert!(Banker::is_safe(&allocation, &max_claim, &[1, 1]));
        assert!(Banker::is_safe(&allocation, &max_claim, &[2, 2]));
    }
}
