//! Counter-driven fault injection (component C8 of the design).
//!
//! The state is thread-local rather than a single process-wide global so
//! that tests run with `cargo test`'s default multi-threaded runner don't
//! trample each other's countdowns.

use std::cell::Cell;

thread_local! {
    static ENABLED: Cell<bool> = const { Cell::new(false) };
    static COUNTDOWN: Cell<i64> = const { Cell::new(-1) };
    static DISABLE_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Raised by [`injection_point`] when the countdown reaches zero.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[error("injected fault")]
pub struct InjectedFault;

/// Lets a harness-aware error type report whether it wraps an [`InjectedFault`]
/// without the fault-injection module depending on any particular error enum.
pub trait FaultAware {
    fn is_injected_fault(&self) -> bool;
}

impl FaultAware for InjectedFault {
    fn is_injected_fault(&self) -> bool {
        true
    }
}

// `TryCopy`/`TryDefault`/`TryAssign` in `cow-vector` bound their associated
// error type on `FaultAware` so that `Error<E>::is_injected_fault` can see
// through an element-level error; the blanket impls for ordinary `Clone`able
// types use `Infallible` as that error, so it needs an (unreachable) impl
// too.
impl FaultAware for std::convert::Infallible {
    fn is_injected_fault(&self) -> bool {
        match *self {}
    }
}

/// Call this at every site that should be able to simulate failure (buffer
/// allocation, element construction). A no-op unless armed via [`arm`] and
/// not currently suppressed by a live [`ScopedDisable`].
pub fn injection_point() -> Result<(), InjectedFault> {
    if !ENABLED.with(|e| e.get()) || DISABLE_DEPTH.with(|d| d.get()) > 0 {
        return Ok(());
    }
    let remaining = COUNTDOWN.with(|c| {
        let next = c.get() - 1;
        c.set(next);
        next
    });
    if remaining < 0 {
        Err(InjectedFault)
    } else {
        Ok(())
    }
}

/// Arms the injector so that the `countdown`-th subsequent `injection_point`
/// call (0-indexed) fails.
fn arm(countdown: i64) {
    ENABLED.with(|e| e.set(true));
    COUNTDOWN.with(|c| c.set(countdown));
}

/// Disables the injector entirely (used for the baseline pass of
/// [`faulty_run`] and whenever no replay is in progress).
fn disarm() {
    ENABLED.with(|e| e.set(false));
    COUNTDOWN.with(|c| c.set(-1));
}

/// Re-entrant scope in which [`injection_point`] is always a no-op. Used
/// around bookkeeping (tracker set mutation, buffer deallocation on an
/// already-failed path) that must not itself be a source of simulated
/// failure.
pub struct ScopedDisable {
    _private: (),
}

impl ScopedDisable {
    pub fn new() -> Self {
        DISABLE_DEPTH.with(|d| d.set(d.get() + 1));
        Self { _private: () }
    }
}

impl Default for ScopedDisable {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScopedDisable {
    fn drop(&mut self) {
        DISABLE_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Deterministic replay driver.
///
/// Runs `f` once with injection disabled (the baseline must succeed), then
/// for `k = 0, 1, 2, …` arms the injector so the `k`-th call to
/// [`injection_point`] fails and reruns `f`. Stops the first time `f`
/// completes successfully. Any error `f` returns that is *not* an injected
/// fault is a genuine test failure and panics immediately so it is not
/// mistaken for an expected injection.
///
/// `f` is responsible for checking its own post-conditions (typically a
/// [`NoNewInstancesGuard`](crate::tracker::NoNewInstancesGuard)) before
/// returning, whether it returns `Ok` or an injected-fault `Err`.
pub fn faulty_run<F, E>(mut f: F)
where
    F: FnMut() -> Result<(), E>,
    E: FaultAware + std::fmt::Debug,
{
    disarm();
    f().expect("baseline run (fault injection disabled) must succeed");

    let mut k: i64 = 0;
    loop {
        arm(k);
        let result = f();
        disarm();
        match result {
            Ok(()) => break,
            Err(e) if e.is_injected_fault() => {
                k += 1;
            }
            Err(e) => panic!("unexpected non-injected error at countdown {k}: {e:?}"),
        }
    }
}
