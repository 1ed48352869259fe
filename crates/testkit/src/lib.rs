//! Fault-injection and leak-detection harness used to exercise the
//! exception-safety guarantees documented by the containers built on top of
//! it.
//!
//! This crate has no opinion about what it is testing: it provides a global
//! (thread-local) failure-injection counter ([`fault`]), a scoped disable
//! guard for bookkeeping that must never itself be poisoned by injection, and
//! a small instance tracker ([`tracker`]) plus a reusable test element
//! ([`Counted`]) that routes its own construction through the injector.

pub mod counted;
pub mod fault;
pub mod tracker;

pub use counted::{Counted, CountedError};
pub use fault::{faulty_run, injection_point, FaultAware, InjectedFault, ScopedDisable};
pub use tracker::NoNewInstancesGuard;
