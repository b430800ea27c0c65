//! The Deadlock scenario's watchdog: the one place in this lab that is
//! allowed to give up on a worker instead of joining it.
//!
//! `std::thread::JoinHandle` has no timed join, so completion is signalled explicitly:
//! each worker closure marks its slot done right before returning, and the scenario
//! waits on that slot for at most `timeout`. Rust gives no safe way to force-terminate
//! another thread (unlike Python's `process.terminate()`), so a stuck worker is instead
//! abandoned — its `JoinHandle` is dropped and the thread is left to run down (or die
//! with the process) rather than being waited on.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// The scenario-side half of a watchdog pair.
pub struct WatchdogWaiter {
    done: Arc<(Mutex<bool>, Condvar)>,
}

/// The worker-side half: call [`mark_done`](Self::mark_done) exactly once, right
/// before the worker thread's closure returns.
#[derive(Clone)]
pub struct WatchdogSignal {
    done: Arc<(Mutex<bool>, Condvar)>,
}

pub fn watchdog_pair() -> (WatchdogSignal, WatchdogWaiter) {
    let done = Arc::new((Mutex::new(false), Condvar::new()));
    (
        WatchdogSignal { done: Arc::clone(&done) },
        WatchdogWaiter { done },
    )
}

impl WatchdogSignal {
    pub fn mark_done(&self) {
        let mut done = self.done.0.lock();
        *done = true;
        self.done.1.notify_all();
    }
}

impl WatchdogWaiter {
    /// Waits at most `timeout` for the matching [`WatchdogSignal::mark_done`] call.
    /// Returns `true` if the worker finished in time, `false` if it is presumed stuck.
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut done = self.done.0.lock();
        if *done {
            return true;
        }
        let result = self.done.1.wait_for(&mut done, timeout);
        *done || !result.timed_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn waiter_sees_completion_signalled_from_another_thread() {
        let (signal, waiter) = watchdog_pair();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            signal.mark_done();
        });
        assert!(waiter.wait(Duration::from_secs(1)));
        handle.join().unwrap();
    }

    #[test]
    fn waiter_times_out_on_a_stuck_worker() {
        let (_signal, waiter) = watchdog_pair();
        assert!(!waiter.wait(Duration::from_millis(20)));
    }
}
