//! Instance tracker (component C9): the set of currently-live element
//! addresses, used by [`NoNewInstancesGuard`] to prove a test leaked nothing.

use crate::fault::ScopedDisable;
use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
    static LIVE: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// Registers `addr` as a live instance. Panics (via `debug_assert!`) if it
/// was already registered — that would mean two elements alias the same
/// storage, which should never happen outside a bug in the container.
pub(crate) fn register(addr: usize) {
    let _disable = ScopedDisable::new();
    LIVE.with(|live| {
        let inserted = live.borrow_mut().insert(addr);
        debug_assert!(inserted, "instance at {addr:#x} registered twice");
    });
}

/// Removes `addr` from the live set. Panics (via `debug_assert!`) if it was
/// not present — a double-drop or drop-without-construct.
pub(crate) fn unregister(addr: usize) {
    let _disable = ScopedDisable::new();
    LIVE.with(|live| {
        let removed = live.borrow_mut().remove(&addr);
        debug_assert!(removed, "instance at {addr:#x} was not registered");
    });
}

/// Returns the number of currently-live tracked instances.
pub fn live_count() -> usize {
    LIVE.with(|live| live.borrow().len())
}

/// Snapshots the live-instance set at construction and asserts, at drop (or
/// earlier via [`expect_no_instances`](Self::expect_no_instances)), that the
/// set has returned to exactly that snapshot — i.e. no leaks and no stray
/// surviving allocations.
pub struct NoNewInstancesGuard {
    snapshot: HashSet<usize>,
}

impl NoNewInstancesGuard {
    pub fn new() -> Self {
        let snapshot = LIVE.with(|live| live.borrow().clone());
        Self { snapshot }
    }

    /// Asserts the live set currently matches the snapshot taken at
    /// construction. Can be called any number of times before drop.
    pub fn expect_no_instances(&self) {
        let _disable = ScopedDisable::new();
        LIVE.with(|live| {
            assert_eq!(
                &self.snapshot,
                &*live.borrow(),
                "live-instance set changed across scope"
            );
        });
    }
}

impl Default for NoNewInstancesGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NoNewInstancesGuard {
    fn drop(&mut self) {
        self.expect_no_instances();
    }
}
