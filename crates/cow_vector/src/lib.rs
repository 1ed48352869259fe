//! A small-size-optimized, copy-on-write sequence container with a
//! documented per-operation exception-safety guarantee.
//!
//! `CowVec<T>` holds at most one element inline (no heap allocation); beyond
//! that it shares a refcounted heap buffer across clones until one of them
//! mutates, at which point the buffer is privatized (copy-on-write). Every
//! element-level operation is allowed to fail — Rust's `Clone`/`Default` and
//! assignment are infallible by signature, so the container is generic over
//! the fallible [`TryCopy`]/[`TryDefault`]/[`TryAssign`] analogues instead
//! (see [`Element`]).

mod error;
mod invariants;
mod raw;
mod traits;
mod vec;

pub use error::Error;
pub use traits::{Element, TryAssign, TryCopy, TryDefault};
pub use vec::CowVec;
