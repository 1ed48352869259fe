//! Debug-only invariant checks (§4.9), mirroring the macro module the
//! sibling `ringmpsc-rs` crate uses to assert protocol invariants at zero
//! cost in release builds.

/// Invariant 3.3.2: `size <= capacity` always holds in state S.
macro_rules! debug_assert_size_le_capacity {
    ($size:expr, $capacity:expr) => {
        debug_assert!(
            $size <= $capacity,
            "size {} exceeds capacity {}",
            $size,
            $capacity
        );
    };
}

/// Invariant 3.3.2: a live S buffer always has `refcount >= 1`.
macro_rules! debug_assert_refcount_live {
    ($refcount:expr) => {
        debug_assert!($refcount >= 1, "refcount {} is not live", $refcount);
    };
}

/// Post-condition of `detach_if_shared` (C4): after detaching, the buffer
/// this container points at must be uniquely owned.
macro_rules! debug_assert_unique_after_detach {
    ($refcount:expr) => {
        debug_assert_eq!($refcount, 1, "buffer not unique after detach");
    };
}

/// Invariant 3.3.3, checked structurally: we cannot safely peek at
/// `MaybeUninit` slots to confirm `[0, size)` is constructed, so this
/// instead asserts the arithmetic relationship the invariant is built on.
macro_rules! debug_assert_slots_constructed {
    ($size:expr, $capacity:expr) => {
        debug_assert!(
            $size <= $capacity,
            "cannot have {} constructed slots in a buffer of capacity {}",
            $size,
            $capacity
        );
    };
}

pub(crate) use debug_assert_refcount_live;
pub(crate) use debug_assert_size_le_capacity;
pub(crate) use debug_assert_slots_constructed;
pub(crate) use debug_assert_unique_after_detach;
