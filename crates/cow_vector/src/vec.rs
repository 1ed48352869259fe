//! `CowVec<T>`: the container itself (§3, §4.1, §4.3–§4.6).

use crate::error::Error;
use crate::invariants::{
    debug_assert_refcount_live, debug_assert_size_le_capacity, debug_assert_slots_constructed,
    debug_assert_unique_after_detach,
};
use crate::raw::{self, PartialBuf, RawBuf};
use crate::traits::{Element, TryCopy};

/// The storage discriminator (C1): a genuine three-way sum type rather than
/// a two-way tag with a null pointer standing in for "empty" (see §4.1).
enum Repr<T> {
    Empty,
    Inline(T),
    Shared(RawBuf<T>),
}

/// A small-size-optimized, copy-on-write sequence container. Holds at most
/// one element inline with no heap allocation; beyond that, a heap buffer is
/// shared (refcounted) across clones until one of them mutates, at which
/// point it is privatized.
///
/// Not `Send`/`Sync`: the refcount is a plain `Cell<usize>` (§5).
pub struct CowVec<T> {
    repr: Repr<T>,
}

fn grown_capacity(capacity: usize) -> usize {
    capacity.saturating_mul(2).max(2)
}

impl<T> CowVec<T> {
    pub fn new() -> Self {
        Self { repr: Repr::Empty }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Inline(_) => 1,
            Repr::Shared(buf) => buf.size(),
        }
    }

    /// Logical capacity: 1 in the empty and inline states (§3.3.5).
    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Empty | Repr::Inline(_) => 1,
            Repr::Shared(buf) => buf.capacity(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[T] {
        match &self.repr {
            Repr::Empty => &[],
            Repr::Inline(v) => std::slice::from_ref(v),
            Repr::Shared(buf) => buf.as_slice(),
        }
    }

    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> Default for CowVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for CowVec<T> {
    fn drop(&mut self) {
        if let Repr::Shared(buf) = &self.repr {
            raw::release(*buf);
        }
    }
}

impl<T: TryCopy> Clone for CowVec<T> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Empty => Repr::Empty,
            Repr::Inline(v) => Repr::Inline(
                v.try_copy()
                    .expect("CowVec::clone: element copy-construction failed"),
            ),
            Repr::Shared(buf) => {
                raw::acquire(*buf);
                Repr::Shared(*buf)
            }
        };
        Self { repr }
    }
}

impl<T: PartialEq> PartialEq for CowVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}
impl<T: Eq> Eq for CowVec<T> {}

impl<T: PartialOrd> PartialOrd for CowVec<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}
impl<T: Ord> Ord for CowVec<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for CowVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T> std::ops::Index<usize> for CowVec<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

/// Consumes the container, moving (uniquely owned) or copying (shared)
/// elements out. The common case — the buffer has only ever had one owner —
/// moves every element out of storage and frees the allocation without
/// running element destructors at all.
impl<T: TryCopy> IntoIterator for CowVec<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        match std::mem::replace(&mut self.repr, Repr::Empty) {
            Repr::Empty => Vec::new().into_iter(),
            Repr::Inline(v) => vec![v].into_iter(),
            Repr::Shared(buf) => {
                let size = buf.size();
                let out: Vec<T> = if buf.is_unique() {
                    let data = buf.data_ptr();
                    let moved = (0..size).map(|i| unsafe { data.add(i).read() }).collect();
                    // every slot has just been read out (moved, not
                    // dropped); tell `release` there is nothing left to
                    // destroy before it frees the allocation.
                    buf.set_size(0);
                    raw::release(buf);
                    moved
                } else {
                    let copied = buf
                        .as_slice()
                        .iter()
                        .map(|v| {
                            v.try_copy()
                                .expect("CowVec::into_iter: element copy-construction failed")
                        })
                        .collect();
                    raw::release(buf);
                    copied
                };
                out.into_iter()
            }
        }
    }
}

impl<T: Element> CowVec<T> {
    /// The gate for every mutation in state S (C4, §4.3). A no-op when the
    /// buffer already has a single owner.
    fn detach_if_shared(&mut self) -> Result<(), Error<T::ElementError>> {
        let buf = match &self.repr {
            Repr::Shared(buf) => *buf,
            _ => return Ok(()),
        };
        debug_assert_refcount_live!(buf.refcount());
        if buf.is_unique() {
            return Ok(());
        }
        let new_buf = raw::alloc_buffer::<T>(buf.capacity()).map_err(Error::Injected)?;
        let mut partial = PartialBuf::new(new_buf);
        for item in buf.as_slice() {
            partial
                .try_push_copy(item)
                .map_err(Error::ElementConstruction)?;
        }
        let new_buf = partial.finish();
        debug_assert_unique_after_detach!(new_buf.refcount());
        debug_assert_slots_constructed!(new_buf.size(), new_buf.capacity());
        raw::release(buf);
        self.repr = Repr::Shared(new_buf);
        Ok(())
    }

    /// Copy-constructs the inline element (if any) into a fresh
    /// single-element buffer, so that a later swap only ever exchanges
    /// pointers (§4.5 `swap`).
    fn promote_inline_to_shared(&mut self) -> Result<(), Error<T::ElementError>> {
        if !matches!(self.repr, Repr::Inline(_)) {
            return Ok(());
        }
        let copy = match &self.repr {
            Repr::Inline(v) => v.try_copy().map_err(Error::ElementConstruction)?,
            _ => unreachable!(),
        };
        let buf = raw::alloc_buffer::<T>(1).map_err(Error::Injected)?;
        let mut partial = PartialBuf::new(buf);
        // Safety: a capacity-1 buffer has exactly one free slot.
        unsafe { partial.push_constructed(copy) };
        self.repr = Repr::Shared(partial.finish());
        Ok(())
    }

    pub fn as_mut_slice(&mut self) -> Result<&mut [T], Error<T::ElementError>> {
        self.detach_if_shared()?;
        Ok(match &mut self.repr {
            Repr::Empty => &mut [],
            Repr::Inline(v) => std::slice::from_mut(v),
            Repr::Shared(buf) => buf.as_mut_slice(),
        })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut T>, Error<T::ElementError>> {
        Ok(self.as_mut_slice()?.get_mut(index))
    }

    pub fn front_mut(&mut self) -> Result<Option<&mut T>, Error<T::ElementError>> {
        Ok(self.as_mut_slice()?.first_mut())
    }

    pub fn back_mut(&mut self) -> Result<Option<&mut T>, Error<T::ElementError>> {
        Ok(self.as_mut_slice()?.last_mut())
    }

    pub fn iter_mut(&mut self) -> Result<std::slice::IterMut<'_, T>, Error<T::ElementError>> {
        Ok(self.as_mut_slice()?.iter_mut())
    }

    /// Builds a container directly from owned elements (used by
    /// construction and by `assign`). No element-level fallible operation is
    /// involved — the only possible failure is `Error::Injected` buffer
    /// allocation.
    pub fn try_from_iter<I>(iter: I) -> Result<Self, Error<T::ElementError>>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = iter.into_iter().collect();
        let repr = match items.len() {
            0 => Repr::Empty,
            1 => Repr::Inline(items.into_iter().next().unwrap()),
            n => {
                let buf = raw::alloc_buffer::<T>(n).map_err(Error::Injected)?;
                let mut partial = PartialBuf::new(buf);
                for item in items {
                    // Safety: `buf` was allocated with capacity exactly `n`.
                    unsafe { partial.push_constructed(item) };
                }
                Repr::Shared(partial.finish())
            }
        };
        Ok(Self { repr })
    }

    /// Replaces the contents by range copy (§4.5 `assign(first, last)`):
    /// builds the replacement fully before touching `self`, so a failure
    /// leaves `self` unchanged.
    pub fn assign<I>(&mut self, iter: I) -> Result<(), Error<T::ElementError>>
    where
        I: IntoIterator<Item = T>,
    {
        let replacement = Self::try_from_iter(iter)?;
        *self = replacement;
        Ok(())
    }

    /// Fallible analogue of `operator=`/`Clone::clone` (§4.5, §9): copies
    /// `other`'s representation into `self`. Strong — on failure `self` is
    /// unchanged.
    pub fn assign_from(&mut self, other: &Self) -> Result<(), Error<T::ElementError>> {
        let replacement = match &other.repr {
            Repr::Empty => Repr::Empty,
            Repr::Inline(v) => Repr::Inline(v.try_copy().map_err(Error::ElementConstruction)?),
            Repr::Shared(buf) => {
                raw::acquire(*buf);
                Repr::Shared(*buf)
            }
        };
        *self = Self { repr: replacement };
        Ok(())
    }

    /// Appends a copy of `value` (§4.5 `push_back`). `value` is already an
    /// owned, standalone `T` by the time it reaches this call — any aliasing
    /// with an existing element of `self` (`c.push_back(c[i])`) was already
    /// resolved by the caller reading `c[i]` before this call could begin,
    /// since the borrow checker forbids holding that borrow across a
    /// `&mut self` call.
    pub fn push_back(&mut self, value: T) -> Result<(), Error<T::ElementError>> {
        match &self.repr {
            Repr::Empty => {
                self.repr = Repr::Inline(value);
                Ok(())
            }
            Repr::Inline(_) => {
                let existing_copy = match &self.repr {
                    Repr::Inline(v) => v.try_copy().map_err(Error::ElementConstruction)?,
                    _ => unreachable!(),
                };
                let buf = raw::alloc_buffer::<T>(2).map_err(Error::Injected)?;
                let mut partial = PartialBuf::new(buf);
                // Safety: capacity 2, this is the first of two slots.
                unsafe { partial.push_constructed(existing_copy) };
                partial
                    .try_push_copy(&value)
                    .map_err(Error::ElementConstruction)?;
                self.repr = Repr::Shared(partial.finish());
                Ok(())
            }
            Repr::Shared(_) => {
                self.detach_if_shared()?;
                let buf = match &self.repr {
                    Repr::Shared(buf) => *buf,
                    _ => unreachable!(),
                };
                let size = buf.size();
                debug_assert_size_le_capacity!(size, buf.capacity());
                if size < buf.capacity() {
                    let copy = value.try_copy().map_err(Error::ElementConstruction)?;
                    // Safety: `size < capacity`, slot `size` is free.
                    unsafe { buf.write_slot(size, copy) };
                    buf.set_size(size + 1);
                    Ok(())
                } else {
                    let new_cap = grown_capacity(buf.capacity());
                    let new_buf = raw::alloc_buffer::<T>(new_cap).map_err(Error::Injected)?;
                    let mut partial = PartialBuf::new(new_buf);
                    for item in buf.as_slice() {
                        partial
                            .try_push_copy(item)
                            .map_err(Error::ElementConstruction)?;
                    }
                    partial
                        .try_push_copy(&value)
                        .map_err(Error::ElementConstruction)?;
                    let new_buf = partial.finish();
                    raw::release(buf);
                    self.repr = Repr::Shared(new_buf);
                    Ok(())
                }
            }
        }
    }

    /// Removes and returns the last element (§4.5 `pop_back`). State S with
    /// `size == 0` is reachable (e.g. popping a shared buffer down to empty,
    /// or `reserve` on an empty container) and is just as empty as state E.
    pub fn pop_back(&mut self) -> Result<Option<T>, Error<T::ElementError>> {
        if self.is_empty() {
            return Ok(None);
        }
        match &self.repr {
            Repr::Empty => unreachable!("handled by the is_empty() check above"),
            Repr::Inline(_) => {
                let value = match std::mem::replace(&mut self.repr, Repr::Empty) {
                    Repr::Inline(v) => v,
                    _ => unreachable!(),
                };
                Ok(Some(value))
            }
            Repr::Shared(_) => {
                self.detach_if_shared()?;
                let buf = match &self.repr {
                    Repr::Shared(buf) => *buf,
                    _ => unreachable!(),
                };
                let size = buf.size();
                let last = size - 1;
                // Safety: slot `last` is live and we just detached to sole
                // ownership.
                let value = unsafe { buf.data_ptr().add(last).read() };
                buf.set_size(last);
                Ok(Some(value))
            }
        }
    }

    /// Inserts a copy of `value` before `pos` (§4.5 `insert`). Returns the
    /// index the element ended up at (always `pos`), since Rust iterators
    /// cannot outlive the reallocation this may perform.
    pub fn insert(&mut self, pos: usize, value: T) -> Result<usize, Error<T::ElementError>> {
        let len = self.len();
        assert!(pos <= len, "insert index {pos} out of bounds (len {len})");
        if pos == len {
            self.push_back(value)?;
            return Ok(pos);
        }
        match &self.repr {
            Repr::Empty => unreachable!("pos < len implies len >= 1"),
            Repr::Inline(_) => {
                debug_assert_eq!(pos, 0);
                let existing_copy = match &self.repr {
                    Repr::Inline(v) => v.try_copy().map_err(Error::ElementConstruction)?,
                    _ => unreachable!(),
                };
                let buf = raw::alloc_buffer::<T>(2).map_err(Error::Injected)?;
                let mut partial = PartialBuf::new(buf);
                partial
                    .try_push_copy(&value)
                    .map_err(Error::ElementConstruction)?;
                // Safety: capacity 2, this is the second of two slots.
                unsafe { partial.push_constructed(existing_copy) };
                self.repr = Repr::Shared(partial.finish());
                Ok(0)
            }
            Repr::Shared(_) => {
                let buf = match &self.repr {
                    Repr::Shared(buf) => *buf,
                    _ => unreachable!(),
                };
                let size = buf.size();
                let new_cap = if size == buf.capacity() {
                    grown_capacity(buf.capacity())
                } else {
                    buf.capacity()
                };
                let new_buf = raw::alloc_buffer::<T>(new_cap).map_err(Error::Injected)?;
                let mut partial = PartialBuf::new(new_buf);
                let source = buf.as_slice();
                for item in &source[..pos] {
                    partial
                        .try_push_copy(item)
                        .map_err(Error::ElementConstruction)?;
                }
                partial
                    .try_push_copy(&value)
                    .map_err(Error::ElementConstruction)?;
                for item in &source[pos..] {
                    partial
                        .try_push_copy(item)
                        .map_err(Error::ElementConstruction)?;
                }
                let new_buf = partial.finish();
                raw::release(buf);
                self.repr = Repr::Shared(new_buf);
                Ok(pos)
            }
        }
    }

    /// Removes the element at `pos` (§4.5 `erase`).
    pub fn erase(&mut self, pos: usize) -> Result<(), Error<T::ElementError>> {
        self.erase_range(pos, pos + 1)
    }

    /// Removes `[first, last)` (§4.5 `erase(first, last)`). Strong if the
    /// erased range reaches the end (no shift needed); basic otherwise, since
    /// the tail shift is by fallible assignment.
    pub fn erase_range(
        &mut self,
        first: usize,
        last: usize,
    ) -> Result<(), Error<T::ElementError>> {
        let len = self.len();
        assert!(
            first <= last && last <= len,
            "erase_range({first}, {last}) out of bounds (len {len})"
        );
        if first == last {
            return Ok(());
        }
        match &self.repr {
            Repr::Empty => unreachable!("first < last <= len == 0 is impossible"),
            Repr::Inline(_) => {
                debug_assert!(first == 0 && last == 1);
                self.repr = Repr::Empty;
                Ok(())
            }
            Repr::Shared(_) => {
                self.detach_if_shared()?;
                let buf = match &self.repr {
                    Repr::Shared(buf) => *buf,
                    _ => unreachable!(),
                };
                let size = buf.size();
                let data = buf.data_ptr();
                if last == size {
                    for i in (first..last).rev() {
                        // Safety: `[first, last)` is a live sub-range.
                        unsafe { std::ptr::drop_in_place(data.add(i)) };
                    }
                    buf.set_size(first);
                    return Ok(());
                }

                let removed = last - first;
                // Shift the surviving tail down by assignment, over the
                // still-live `[first, last)` slots — each `try_assign` drops
                // its destination's current (live) value before overwriting
                // it, exactly as `Vec::drain` does. `dst < src` throughout,
                // so every slot is read (as a source) before it is ever
                // overwritten (as a destination further down).
                let mut dst = first;
                for src in last..size {
                    let (dst_slot, src_slot) =
                        unsafe { (&mut *data.add(dst), &*data.add(src)) };
                    dst_slot
                        .try_assign(src_slot)
                        .map_err(Error::ElementAssignment)?;
                    dst += 1;
                }
                // The final `removed` slots are now stale duplicates of
                // values already shifted earlier in the buffer.
                for i in (size - removed)..size {
                    // Safety: every slot in `[size - removed, size)` is
                    // still a live (if stale) element.
                    unsafe { std::ptr::drop_in_place(data.add(i)) };
                }
                buf.set_size(size - removed);
                Ok(())
            }
        }
    }

    /// Replaces contents with `new_len` elements (§4.5 `resize`).
    pub fn resize(&mut self, new_len: usize) -> Result<(), Error<T::ElementError>> {
        let len = self.len();
        if new_len == len {
            return Ok(());
        }
        if new_len < len {
            self.detach_if_shared()?;
            match &self.repr {
                Repr::Inline(_) => {
                    debug_assert_eq!(new_len, 0);
                    self.repr = Repr::Empty;
                }
                Repr::Shared(_) => {
                    let buf = match &self.repr {
                        Repr::Shared(buf) => *buf,
                        _ => unreachable!(),
                    };
                    let data = buf.data_ptr();
                    for i in (new_len..len).rev() {
                        // Safety: `[new_len, len)` is a live sub-range.
                        unsafe { std::ptr::drop_in_place(data.add(i)) };
                    }
                    buf.set_size(new_len);
                }
                Repr::Empty => unreachable!(),
            }
            return Ok(());
        }

        match &self.repr {
            Repr::Empty if new_len == 1 => {
                let value = T::try_default().map_err(Error::ElementConstruction)?;
                self.repr = Repr::Inline(value);
                Ok(())
            }
            Repr::Empty => {
                let buf = raw::alloc_buffer::<T>(new_len).map_err(Error::Injected)?;
                let mut partial = PartialBuf::new(buf);
                for _ in 0..new_len {
                    partial
                        .try_push_default()
                        .map_err(Error::ElementConstruction)?;
                }
                self.repr = Repr::Shared(partial.finish());
                Ok(())
            }
            Repr::Inline(_) => {
                let existing_copy = match &self.repr {
                    Repr::Inline(v) => v.try_copy().map_err(Error::ElementConstruction)?,
                    _ => unreachable!(),
                };
                let buf = raw::alloc_buffer::<T>(new_len).map_err(Error::Injected)?;
                let mut partial = PartialBuf::new(buf);
                // Safety: `new_len >= 2`, this is the first slot.
                unsafe { partial.push_constructed(existing_copy) };
                for _ in 1..new_len {
                    partial
                        .try_push_default()
                        .map_err(Error::ElementConstruction)?;
                }
                self.repr = Repr::Shared(partial.finish());
                Ok(())
            }
            Repr::Shared(_) => {
                self.detach_if_shared()?;
                let buf = match &self.repr {
                    Repr::Shared(buf) => *buf,
                    _ => unreachable!(),
                };
                if new_len <= buf.capacity() {
                    let size = buf.size();
                    // Build the new tail in a local `Vec` first: if any
                    // default-construction fails, `buf` is never touched
                    // (strong guarantee) and the partially built tail is
                    // dropped by `Vec`'s own `Drop`.
                    let mut tail = Vec::with_capacity(new_len - size);
                    for _ in size..new_len {
                        tail.push(T::try_default().map_err(Error::ElementConstruction)?);
                    }
                    let data = buf.data_ptr();
                    for (offset, value) in tail.into_iter().enumerate() {
                        // Safety: slots `[size, new_len)` are free and
                        // `new_len <= capacity`.
                        unsafe { data.add(size + offset).write(value) };
                    }
                    buf.set_size(new_len);
                    Ok(())
                } else {
                    let new_buf = raw::alloc_buffer::<T>(new_len).map_err(Error::Injected)?;
                    let mut partial = PartialBuf::new(new_buf);
                    for item in buf.as_slice() {
                        partial
                            .try_push_copy(item)
                            .map_err(Error::ElementConstruction)?;
                    }
                    for _ in buf.size()..new_len {
                        partial
                            .try_push_default()
                            .map_err(Error::ElementConstruction)?;
                    }
                    let new_buf = partial.finish();
                    raw::release(buf);
                    self.repr = Repr::Shared(new_buf);
                    Ok(())
                }
            }
        }
    }

    /// Releases the buffer (if any) and becomes empty (§4.5 `clear`). Never
    /// needs to detach: a shared buffer's other owners keep their own handle
    /// regardless of whether `self` drops its reference.
    pub fn clear(&mut self) {
        if let Repr::Shared(buf) = std::mem::replace(&mut self.repr, Repr::Empty) {
            raw::release(buf);
        }
    }

    /// If `n <= capacity()`, a no-op. Otherwise grows to capacity exactly
    /// `n` (§4.4 `reserve`).
    pub fn reserve(&mut self, n: usize) -> Result<(), Error<T::ElementError>> {
        if n <= self.capacity() {
            return Ok(());
        }
        match &self.repr {
            Repr::Empty => {
                let buf = raw::alloc_buffer::<T>(n).map_err(Error::Injected)?;
                self.repr = Repr::Shared(buf);
                Ok(())
            }
            Repr::Inline(_) => {
                let existing_copy = match &self.repr {
                    Repr::Inline(v) => v.try_copy().map_err(Error::ElementConstruction)?,
                    _ => unreachable!(),
                };
                let buf = raw::alloc_buffer::<T>(n).map_err(Error::Injected)?;
                let mut partial = PartialBuf::new(buf);
                // Safety: `n > 1`, room for at least this one slot.
                unsafe { partial.push_constructed(existing_copy) };
                self.repr = Repr::Shared(partial.finish());
                Ok(())
            }
            Repr::Shared(_) => {
                let buf = match &self.repr {
                    Repr::Shared(buf) => *buf,
                    _ => unreachable!(),
                };
                let new_buf = raw::alloc_buffer::<T>(n).map_err(Error::Injected)?;
                let mut partial = PartialBuf::new(new_buf);
                for item in buf.as_slice() {
                    partial
                        .try_push_copy(item)
                        .map_err(Error::ElementConstruction)?;
                }
                let new_buf = partial.finish();
                raw::release(buf);
                self.repr = Repr::Shared(new_buf);
                Ok(())
            }
        }
    }

    /// Drops unused capacity (§4.4 `shrink_to_fit`). Never needs to detach:
    /// every branch either installs a freshly allocated buffer or drops our
    /// handle to the old one, neither of which disturbs other owners.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error<T::ElementError>> {
        let buf = match &self.repr {
            Repr::Shared(buf) => *buf,
            _ => return Ok(()),
        };
        let size = buf.size();
        if size == buf.capacity() {
            return Ok(());
        }
        if size == 0 {
            raw::release(buf);
            self.repr = Repr::Empty;
            return Ok(());
        }
        if size == 1 {
            return match buf.as_slice()[0].try_copy() {
                Ok(value) => {
                    raw::release(buf);
                    self.repr = Repr::Inline(value);
                    Ok(())
                }
                Err(e) => Err(Error::ElementConstruction(e)),
            };
        }
        let new_buf = raw::alloc_buffer::<T>(size).map_err(Error::Injected)?;
        let mut partial = PartialBuf::new(new_buf);
        for item in buf.as_slice() {
            partial
                .try_push_copy(item)
                .map_err(Error::ElementConstruction)?;
        }
        let new_buf = partial.finish();
        raw::release(buf);
        self.repr = Repr::Shared(new_buf);
        Ok(())
    }

    /// Exchanges representations with `other` (§4.5 `swap`, §9). A
    /// self-swap (reachable only via raw-pointer aliasing, since the borrow
    /// checker forbids two simultaneous `&mut` borrows of the same binding)
    /// is a documented no-op.
    pub fn swap(&mut self, other: &mut Self) -> Result<(), Error<T::ElementError>> {
        if std::ptr::eq(self, other) {
            return Ok(());
        }
        match (&self.repr, &other.repr) {
            (Repr::Empty, Repr::Empty) | (Repr::Shared(_), Repr::Shared(_)) => {
                std::mem::swap(&mut self.repr, &mut other.repr);
                Ok(())
            }
            (Repr::Inline(_), Repr::Inline(_)) => {
                let a = match &self.repr {
                    Repr::Inline(v) => v.try_copy(),
                    _ => unreachable!(),
                };
                let b = match &other.repr {
                    Repr::Inline(v) => v.try_copy(),
                    _ => unreachable!(),
                };
                match (a, b) {
                    (Ok(a), Ok(b)) => {
                        self.repr = Repr::Inline(b);
                        other.repr = Repr::Inline(a);
                        Ok(())
                    }
                    (a, b) => {
                        // Basic: match the "empty both" behavior on
                        // failure rather than leave one side inconsistent.
                        self.repr = Repr::Empty;
                        other.repr = Repr::Empty;
                        let err = a.err().or_else(|| b.err()).unwrap();
                        Err(Error::ElementConstruction(err))
                    }
                }
            }
            _ => {
                self.promote_inline_to_shared()?;
                other.promote_inline_to_shared()?;
                std::mem::swap(&mut self.repr, &mut other.repr);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state() {
        let c: CowVec<i32> = CowVec::new();
        assert_eq!(c.len(), 0);
        assert_eq!(c.capacity(), 1);
        assert!(c.is_empty());
        assert_eq!(c.as_slice(), &[]);
    }

    #[test]
    fn inline_state_after_one_push() {
        let mut c: CowVec<i32> = CowVec::new();
        c.push_back(7).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.capacity(), 1);
        assert_eq!(c.as_slice(), &[7]);
    }

    #[test]
    fn shared_state_after_second_push() {
        let mut c: CowVec<i32> = CowVec::new();
        c.push_back(1).unwrap();
        c.push_back(2).unwrap();
        assert_eq!(c.len(), 2);
        assert!(c.capacity() >= 2);
        assert_eq!(c.as_slice(), &[1, 2]);
    }

    #[test]
    fn reserve_transitions_inline_to_shared_without_growth_on_push() {
        let mut c: CowVec<i32> = CowVec::new();
        c.push_back(1).unwrap();
        c.reserve(8).unwrap();
        assert_eq!(c.capacity(), 8);
        c.push_back(2).unwrap();
        assert_eq!(c.capacity(), 8);
        assert_eq!(c.as_slice(), &[1, 2]);
    }

    #[test]
    fn shrink_to_fit_collapses_to_inline_then_empty() {
        let mut c: CowVec<i32> = CowVec::try_from_iter([1, 2, 3]).unwrap();
        c.pop_back().unwrap();
        c.pop_back().unwrap();
        c.shrink_to_fit().unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.capacity(), 1);
        c.pop_back().unwrap();
        c.shrink_to_fit().unwrap();
        assert_eq!(c.len(), 0);
        assert_eq!(c.capacity(), 1);
    }

    #[test]
    fn resize_grows_with_defaults_and_shrinks_by_truncation() {
        let mut c: CowVec<i32> = CowVec::try_from_iter([1, 2]).unwrap();
        c.resize(5).unwrap();
        assert_eq!(c.as_slice(), &[1, 2, 0, 0, 0]);
        c.resize(1).unwrap();
        assert_eq!(c.as_slice(), &[1]);
    }

    #[test]
    fn into_iter_collects_owned_values() {
        let c = CowVec::try_from_iter([1, 2, 3]).unwrap();
        let collected: Vec<i32> = c.into_iter().collect();
        assert_eq!(collected, vec![1, 2, 3]);
    }

    #[test]
    fn into_iter_on_shared_clone_copies_rather_than_steals() {
        let c = CowVec::try_from_iter([1, 2, 3]).unwrap();
        let d = c.clone();
        let collected: Vec<i32> = d.into_iter().collect();
        assert_eq!(collected, vec![1, 2, 3]);
        assert_eq!(c.as_slice(), &[1, 2, 3]);
    }
}
