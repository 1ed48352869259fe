//! The error taxonomy of §7: every fallible container operation returns
//! `Result<T, Error<E>>` where `E` is the element type's own error (see
//! `traits.rs`).

use testkit::{FaultAware, InjectedFault};

/// Everything that can go wrong inside a `CowVec<T>` operation.
///
/// Destructor failure is conspicuously absent: `Drop::drop` cannot return a
/// `Result` in Rust, so it is instead modeled as a caught-and-resumed panic
/// (see `raw::release`), not a variant here.
#[derive(Debug, thiserror::Error)]
pub enum Error<E: std::error::Error + FaultAware + 'static> {
    /// A simulated failure at a `testkit::fault::injection_point()` call
    /// inside buffer allocation itself (as opposed to inside an element
    /// constructor — that's `ElementConstruction` below). Real allocator
    /// exhaustion aborts the process via `alloc::handle_alloc_error`, the
    /// same way `std::vec::Vec` handles it, and is therefore never this
    /// variant.
    #[error("injected fault")]
    Injected(#[from] InjectedFault),

    /// The element type's `TryCopy::try_copy`/`TryDefault::try_default`
    /// failed. May itself be an injected fault (see `is_injected_fault`
    /// below) when `E` is a harness element type like `testkit::Counted`.
    #[error("element construction failed: {0}")]
    ElementConstruction(#[source] E),

    /// The element type's `TryAssign::try_assign` failed (only reachable
    /// from the middle-erase shift).
    #[error("element assignment failed: {0}")]
    ElementAssignment(#[source] E),
}

impl<E: std::error::Error + FaultAware + 'static> FaultAware for Error<E> {
    fn is_injected_fault(&self) -> bool {
        match self {
            Error::Injected(_) => true,
            Error::ElementConstruction(e) | Error::ElementAssignment(e) => e.is_injected_fault(),
        }
    }
}
