//! Fallible analogues of `Clone`/`Default`/assignment (§4.5.1 of the design).
//!
//! `Clone::clone`, `Default::default` and `Copy`-assignment are all
//! infallible by signature in Rust. A container whose entire point is
//! tolerating element-operation failure cannot be built on top of them
//! directly, so `CowVec<T>` is generic over these three traits instead of
//! `Clone`/`Default`.
//!
//! Any ordinary `Clone`/`Default` type gets all three for free via the
//! blanket impls below (each keyed off `Clone`/`Default` independently, not
//! derived from one another — see the note on `Counted` below for why);
//! [`testkit::Counted`] implements all three directly (and deliberately does
//! not implement `Clone`/`Default`) so its constructors can route through the
//! fault injector.
//!
//! [`Element`] collapses the three into the single bound `CowVec<T>` actually
//! uses, so its mutating API reports one `Error<T::ElementError>` type rather
//! than a different error per method.

use std::convert::Infallible;
use testkit::FaultAware;

/// Fallible copy-construction: "what `Clone::clone` would be if it could
/// fail."
pub trait TryCopy: Sized {
    type Error: std::error::Error + FaultAware + 'static;

    fn try_copy(&self) -> Result<Self, Self::Error>;
}

/// Fallible default-construction, used to fill the tail when `resize` grows
/// a container.
pub trait TryDefault: Sized {
    type Error: std::error::Error + FaultAware + 'static;

    fn try_default() -> Result<Self, Self::Error>;
}

/// Fallible copy-assignment, used by the middle-erase shift.
pub trait TryAssign: Sized {
    type Error: std::error::Error + FaultAware + 'static;

    fn try_assign(&mut self, source: &Self) -> Result<(), Self::Error>;
}

impl<T: Clone> TryCopy for T {
    type Error = Infallible;

    fn try_copy(&self) -> Result<Self, Infallible> {
        Ok(self.clone())
    }
}

impl<T: Default> TryDefault for T {
    type Error = Infallible;

    fn try_default() -> Result<Self, Infallible> {
        Ok(T::default())
    }
}

impl<T: Clone> TryAssign for T {
    type Error = Infallible;

    fn try_assign(&mut self, source: &Self) -> Result<(), Infallible> {
        self.clone_from(source);
        Ok(())
    }
}

// `Counted` routes construction and assignment through independent
// `injection_point()` calls (see `testkit::counted`), matching the original's
// separate fault-injection sites in its constructor and `operator=`. A
// blanket `TryAssign` derived from `TryCopy` (construct a temporary, then
// move it over `self`) would collapse those into a single shared injection
// site, undercounting the independently injectable failure points a
// fault-injection replay is supposed to enumerate. `Counted` therefore
// implements `try_assign` directly, with its own `injection_point()` call —
// this is why `TryAssign` is *not* blanket-derived from `TryCopy` above.
impl TryCopy for testkit::Counted {
    type Error = testkit::CountedError;

    fn try_copy(&self) -> Result<Self, Self::Error> {
        self.try_clone()
    }
}

impl TryDefault for testkit::Counted {
    type Error = testkit::CountedError;

    fn try_default() -> Result<Self, Self::Error> {
        testkit::Counted::try_new(0)
    }
}

impl TryAssign for testkit::Counted {
    type Error = testkit::CountedError;

    fn try_assign(&mut self, source: &Self) -> Result<(), Self::Error> {
        self.try_assign_from(source)
    }
}

/// An element type usable by `CowVec<T>`: all three fallible operations,
/// agreeing on one error type. `CowVec<T>`'s mutating API is generic over
/// this single bound rather than threading `TryCopy`/`TryDefault`/`TryAssign`
/// separately through every method, since a single container operation (e.g.
/// middle-erase) can need more than one of the three in the same `Result`.
///
/// Every blanket `Clone`/`Default`-based impl above already agrees on
/// `Infallible`, and every `testkit::Counted` impl above already agrees on
/// `CountedError`, so this is satisfied automatically by both.
pub trait Element:
    TryCopy<Error = Self::ElementError>
    + TryDefault<Error = Self::ElementError>
    + TryAssign<Error = Self::ElementError>
{
    type ElementError: std::error::Error + FaultAware + 'static;
}

impl<T> Element for T
where
    T: TryCopy,
    T: TryDefault<Error = <T as TryCopy>::Error>,
    T: TryAssign<Error = <T as TryCopy>::Error>,
{
    type ElementError = <T as TryCopy>::Error;
}
