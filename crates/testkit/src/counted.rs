//! [`Counted`]: a reusable test element (the "transcoded element" of the
//! design's glossary) whose construction and copying can fail via
//! [`injection_point`], and whose every live instance is registered with
//! [`tracker`](crate::tracker).
//!
//! `Counted` deliberately does **not** implement `Clone`/`Default` — it
//! exposes `try_*` constructors instead, so that a container generic over
//! fallible element operations can exercise real failure paths instead of
//! infallible stdlib ones.

use crate::fault::{injection_point, InjectedFault};
use crate::tracker::{register, unregister};
use std::cell::Cell;

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(0) };
}

fn next_id() -> u64 {
    NEXT_ID.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

/// The only way `Counted` construction can fail: an injected fault.
pub type CountedError = InjectedFault;

/// A test element that stores its logical value XORed with an identity fixed
/// at construction, rather than `self`'s own address: Rust relocates values
/// on every ordinary move (a return, a `Vec::push`, a slot write), unlike the
/// original's `this`, which never moves for the lifetime of the object, so an
/// address recomputed after such a move would not match the one used to
/// encode `stored`. The per-instance counter plays the same role the
/// original's address did without depending on where the bytes currently
/// live.
pub struct Counted {
    stored: i64,
    id: u64,
}

fn transcode(value: i64, id: u64) -> i64 {
    value ^ id as i64
}

impl Counted {
    /// Constructs a new instance holding `value`, going through
    /// [`injection_point`] first so tests can simulate construction failure.
    pub fn try_new(value: i64) -> Result<Self, CountedError> {
        injection_point()?;
        let id = next_id();
        register(id as usize);
        Ok(Self {
            stored: transcode(value, id),
            id,
        })
    }

    /// Copy-constructs a new instance with the same logical value as `self`.
    pub fn try_clone(&self) -> Result<Self, CountedError> {
        Self::try_new(self.value())
    }

    /// The logical value, after reversing the per-instance transcoding.
    pub fn value(&self) -> i64 {
        transcode(self.stored, self.id)
    }

    /// Assigns `source`'s logical value to `self` in place, going through
    /// [`injection_point`] first. `self`'s own identity is left untouched —
    /// only the payload changes, mirroring the original's `operator=`, which
    /// keeps `this` and overwrites only `data`.
    pub fn try_assign_from(&mut self, source: &Self) -> Result<(), CountedError> {
        injection_point()?;
        self.stored = transcode(source.value(), self.id);
        Ok(())
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        unregister(self.id as usize);
    }
}

impl std::fmt::Debug for Counted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counted").field("value", &self.value()).finish()
    }
}

impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl Eq for Counted {}

impl PartialOrd for Counted {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Counted {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value().cmp(&other.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::NoNewInstancesGuard;

    #[test]
    fn round_trips_value() {
        let guard = NoNewInstancesGuard::new();
        let c = Counted::try_new(42).unwrap();
        assert_eq!(c.value(), 42);
        drop(c);
        guard.expect_no_instances();
    }

    #[test]
    fn clone_is_independent() {
        let guard = NoNewInstancesGuard::new();
        let a = Counted::try_new(7).unwrap();
        let b = a.try_clone().unwrap();
        assert_eq!(a.value(), b.value());
        drop(a);
        drop(b);
        guard.expect_no_instances();
    }

    #[test]
    fn assign_overwrites_value() {
        let guard = NoNewInstancesGuard::new();
        let a = Counted::try_new(1).unwrap();
        let mut b = Counted::try_new(2).unwrap();
        b.try_assign_from(&a).unwrap();
        assert_eq!(b.value(), 1);
        drop(a);
        drop(b);
        guard.expect_no_instances();
    }
}
