// crates/media-core/src/cycle_event.rs
//
// Cycle events (spec.md §4.7, §9): resettable completion gates used as
// coarse pipeline barriers between the reader, decoder, and renderer loops.
// Deliberately not a condvar-per-item signal — `begin` drops the gate shut,
// `complete` releases every waiter, `wait` blocks until the next release.
// A plain Mutex<bool> + Condvar avoids the spurious-wakeup bookkeeping a
// raw condvar loop would need at every call site.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

pub struct CycleEvent {
    complete: Mutex<bool>,
    cvar: Condvar,
}

impl CycleEvent {
    /// Starts in the completed state so an initial `wait` from another loop
    /// doesn't block before the owning loop has run its first cycle.
    pub fn new() -> Self {
        Self { complete: Mutex::new(true), cvar: Condvar::new() }
    }

    /// Marks the start of one iteration: the gate is shut until `complete`.
    pub fn begin(&self) {
        *self.complete.lock().unwrap() = false;
    }

    /// Marks the end of one iteration and releases every waiter.
    pub fn complete(&self) {
        *self.complete.lock().unwrap() = true;
        self.cvar.notify_all();
    }

    /// Blocks until the current iteration completes.
    pub fn wait(&self) {
        let mut guard = self.complete.lock().unwrap();
        while !*guard {
            guard = self.cvar.wait(guard).unwrap();
        }
    }

    /// Blocks until completion or `timeout`, whichever comes first. Returns
    /// whether the gate was observed complete.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self.complete.lock().unwrap();
        if *guard {
            return true;
        }
        let (guard, result) = self.cvar.wait_timeout(guard, timeout).unwrap();
        *guard || !result.timed_out()
    }
}

impl Default for CycleEvent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn starts_complete() {
        let e = CycleEvent::new();
        e.wait(); // must not block
    }

    #[test]
    fn begin_blocks_wait_until_complete() {
        let e = Arc::new(CycleEvent::new());
        e.begin();
        let waiter = Arc::clone(&e);
        let handle = thread::spawn(move || waiter.wait());
        thread::sleep(Duration::from_millis(20));
        assert!(!handle.is_finished());
        e.complete();
        handle.join().unwrap();
    }

    #[test]
    fn wait_timeout_reports_pending() {
        let e = CycleEvent::new();
        e.begin();
        assert!(!e.wait_timeout(Duration::from_millis(10)));
        e.complete();
        assert!(e.wait_timeout(Duration::from_millis(10)));
    }
}
