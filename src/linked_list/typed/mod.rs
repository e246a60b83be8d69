//! # Typed List
//!
//! A singly linked list that is safe to share between threads.
//!
//! Every operation takes the list's single lock for its whole duration, so
//! operations are totally ordered and never observe each other's partial
//! state. There is no reader/writer distinction: reads lock too.
//!
//! The list owns its elements. Insertion moves the caller's value in and
//! removal moves it back out; elements still in the list when it is cleared
//! or dropped are dropped in head-to-tail order.
//!
//! ## Misuse
//!
//! The lock is not reentrant. A [`for_each`](TypedList::for_each) visitor must
//! not call back into the list it is visiting. With the `std` feature such a
//! call fails with [`LockError::Reentrant`](crate::error::LockError::Reentrant);
//! without it, it deadlocks.

use core::fmt;
use core::mem;
use core::sync::atomic::{AtomicUsize, Ordering};

use alloc::vec::Vec;
use crossbeam_utils::CachePadded;

use crate::error::ListError;

use self::lock::{CheckedGuard, CheckedLock};
use self::raw::RawList;

mod lock;
mod raw;

#[cfg(test)]
mod tests;

/// A thread-safe singly linked list of `T`.
///
/// See the [module documentation](self) for the locking rules.
pub struct TypedList<T> {
    raw: CheckedLock<RawList<T>>,
    /// Mirror of the list length, readable without the lock.
    len: CachePadded<AtomicUsize>,
}

impl<T> TypedList<T> {
    /// Creates an empty list.
    ///
    /// # Errors
    /// Returns [`ListError::InvalidArgument`] if `T` is zero-sized.
    pub fn new() -> Result<Self, ListError> {
        TypedListBuilder::new().build()
    }

    /// Creates an empty list with room for `capacity` elements before the
    /// node storage has to grow.
    ///
    /// # Errors
    /// Returns [`ListError::InvalidArgument`] if `T` is zero-sized, or
    /// [`ListError::ResourceExhausted`] if the storage cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, ListError> {
        TypedListBuilder::new().with_capacity(capacity).build()
    }

    /// The size in bytes of one element. Fixed for the life of the list and
    /// never zero.
    pub const fn element_size(&self) -> usize {
        mem::size_of::<T>()
    }

    /// Inserts `value` before the current head.
    pub fn prepend(&self, value: T) -> Result<(), ListError> {
        let mut raw = self.lock("prepend")?;
        raw.push_front(value)?;
        self.sync_len(&raw);
        tracing::trace!(len = raw.len(), "prepend");
        Ok(())
    }

    /// Inserts `value` after the current tail.
    pub fn append(&self, value: T) -> Result<(), ListError> {
        let mut raw = self.lock("append")?;
        raw.push_back(value)?;
        self.sync_len(&raw);
        tracing::trace!(len = raw.len(), "append");
        Ok(())
    }

    /// Removes and returns the head element.
    ///
    /// # Errors
    /// Returns [`ListError::EmptyCollection`] if the list is empty.
    pub fn pop_head(&self) -> Result<T, ListError> {
        let mut raw = self.lock("pop_head")?;
        let value = raw.pop_front().ok_or(ListError::EmptyCollection)?;
        self.sync_len(&raw);
        tracing::trace!(len = raw.len(), "pop_head");
        Ok(value)
    }

    /// Removes and returns the tail element.
    ///
    /// This walks the list from the head to find the new tail, so it costs
    /// `O(len)`.
    ///
    /// # Errors
    /// Returns [`ListError::EmptyCollection`] if the list is empty.
    pub fn pop_tail(&self) -> Result<T, ListError> {
        let mut raw = self.lock("pop_tail")?;
        let value = raw.pop_back().ok_or(ListError::EmptyCollection)?;
        self.sync_len(&raw);
        tracing::trace!(len = raw.len(), "pop_tail");
        Ok(value)
    }

    /// Calls `visit` on each element from head to tail, stopping after the
    /// first call that returns `false`.
    ///
    /// The lock is held for the entire walk; `visit` must not touch this list.
    pub fn for_each<F>(&self, mut visit: F) -> Result<(), ListError>
    where
        F: FnMut(&T) -> bool,
    {
        let raw = self.lock("for_each")?;
        let mut visited = 0usize;
        for value in raw.iter() {
            visited += 1;
            if !visit(value) {
                break;
            }
        }
        tracing::trace!(visited, len = raw.len(), "for_each");
        Ok(())
    }

    /// Drops every element. The list stays usable.
    ///
    /// The list is emptied before any element is dropped, so a panicking
    /// `Drop` still leaves it empty and consistent.
    pub fn clear(&self) -> Result<(), ListError> {
        let mut raw = self.lock("clear")?;
        let detached = raw.take();
        self.sync_len(&raw);
        drop(raw);

        let dropped = detached.len();
        drop(detached);
        tracing::debug!(dropped, "clear");
        Ok(())
    }

    /// Drops every element and then the list itself.
    ///
    /// Dropping the list has the same effect. Owning the list means no guard
    /// can be outstanding, so the lock is never contended here.
    pub fn destroy(mut self) -> Result<(), ListError> {
        let detached = self.raw.get_mut().take();
        self.len.store(0, Ordering::Release);
        let dropped = detached.len();
        drop(detached);
        tracing::debug!(dropped, "destroy");
        Ok(())
    }

    /// The number of elements.
    ///
    /// Read without taking the lock: under concurrent mutation this is only a
    /// snapshot, and may be stale by the time the caller looks at it.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Whether [`len`](Self::len) is zero, with the same caveat.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self, op: &'static str) -> Result<CheckedGuard<'_, RawList<T>>, ListError> {
        self.raw.lock().map_err(|error| {
            tracing::warn!(op, %error, "failed to lock list");
            ListError::Lock(error)
        })
    }

    fn sync_len(&self, raw: &RawList<T>) {
        self.len.store(raw.len(), Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let raw = self.lock("assert_consistent").unwrap();
        raw.assert_consistent();
        assert_eq!(raw.len(), self.len(), "len mirror out of sync");
    }
}

impl<T: Clone> TypedList<T> {
    /// Returns a copy of the head element, removing it from the list if
    /// `remove` is set.
    ///
    /// # Errors
    /// Returns [`ListError::EmptyCollection`] if the list is empty.
    pub fn head(&self, remove: bool) -> Result<T, ListError> {
        if remove {
            self.pop_head()
        } else {
            self.peek_head()
        }
    }

    /// Returns a copy of the tail element, removing it from the list if
    /// `remove` is set. Removal costs `O(len)`, see [`pop_tail`](Self::pop_tail).
    ///
    /// # Errors
    /// Returns [`ListError::EmptyCollection`] if the list is empty.
    pub fn tail(&self, remove: bool) -> Result<T, ListError> {
        if remove {
            self.pop_tail()
        } else {
            self.peek_tail()
        }
    }

    /// Like [`head`](Self::head), but writes into caller-owned storage. `out`
    /// is left untouched on error.
    pub fn head_into(&self, out: &mut T, remove: bool) -> Result<(), ListError> {
        if remove {
            *out = self.pop_head()?;
        } else {
            let raw = self.lock("head_into")?;
            out.clone_from(raw.front().ok_or(ListError::EmptyCollection)?);
        }
        Ok(())
    }

    /// Like [`tail`](Self::tail), but writes into caller-owned storage. `out`
    /// is left untouched on error.
    pub fn tail_into(&self, out: &mut T, remove: bool) -> Result<(), ListError> {
        if remove {
            *out = self.pop_tail()?;
        } else {
            let raw = self.lock("tail_into")?;
            out.clone_from(raw.back().ok_or(ListError::EmptyCollection)?);
        }
        Ok(())
    }

    /// Returns a copy of the head element.
    pub fn peek_head(&self) -> Result<T, ListError> {
        let raw = self.lock("peek_head")?;
        raw.front().cloned().ok_or(ListError::EmptyCollection)
    }

    /// Returns a copy of the tail element.
    pub fn peek_tail(&self) -> Result<T, ListError> {
        let raw = self.lock("peek_tail")?;
        raw.back().cloned().ok_or(ListError::EmptyCollection)
    }

    /// Copies the whole list, head to tail, under a single lock acquisition.
    pub fn snapshot(&self) -> Result<Vec<T>, ListError> {
        let raw = self.lock("snapshot")?;
        let mut out = Vec::new();
        out.try_reserve_exact(raw.len())
            .map_err(|_| ListError::ResourceExhausted)?;
        out.extend(raw.iter().cloned());
        Ok(out)
    }
}

impl<T: fmt::Debug> fmt::Debug for TypedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw.lock() {
            Ok(raw) => f.debug_list().entries(raw.iter()).finish(),
            Err(_) => f
                .debug_struct("TypedList")
                .field("len", &self.len())
                .finish_non_exhaustive(),
        }
    }
}

/// Configures a [`TypedList`] before it is built.
///
/// ```
/// use mola_typed_list::prelude::*;
///
/// let list: TypedList<u64> = TypedListBuilder::new().with_capacity(128).build().unwrap();
/// assert!(list.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypedListBuilder {
    capacity: usize,
}

impl TypedListBuilder {
    /// Create a new builder with default settings.
    pub const fn new() -> Self {
        Self { capacity: 0 }
    }

    /// Set how many nodes to allocate up front.
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Build the list.
    ///
    /// # Errors
    /// Returns [`ListError::InvalidArgument`] if `T` is zero-sized, or
    /// [`ListError::ResourceExhausted`] if the initial capacity cannot be
    /// allocated.
    pub fn build<T>(self) -> Result<TypedList<T>, ListError> {
        if mem::size_of::<T>() == 0 {
            tracing::warn!(
                element = core::any::type_name::<T>(),
                "refusing to build a list of zero-sized elements"
            );
            return Err(ListError::InvalidArgument("element size must be non-zero"));
        }

        let raw = RawList::with_capacity(self.capacity)?;
        tracing::debug!(
            element = core::any::type_name::<T>(),
            element_size = mem::size_of::<T>(),
            capacity = self.capacity,
            "new list"
        );
        Ok(TypedList {
            raw: CheckedLock::new(raw),
            len: CachePadded::new(AtomicUsize::new(0)),
        })
    }
}
