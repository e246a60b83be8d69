use alloc::vec::Vec;

use crate::error::ListError;

/// A node of the list: an owned element and the index of its successor.
struct Node<T> {
    value: T,
    next: Option<usize>,
}

enum Slot<T> {
    Vacant { next_free: Option<usize> },
    Occupied(Node<T>),
}

/// The unsynchronized singly linked list behind a `TypedList`.
///
/// Nodes live in an arena and link to each other by index. Released slots are
/// chained into a free list and reused by later insertions; once the list
/// drains to empty the arena itself is reset.
pub(crate) struct RawList<T> {
    slots: Vec<Slot<T>>,
    free: Option<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> RawList<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Result<Self, ListError> {
        let mut list = Self::new();
        list.slots
            .try_reserve(capacity)
            .map_err(|_| ListError::ResourceExhausted)?;
        Ok(list)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn push_front(&mut self, value: T) -> Result<(), ListError> {
        let idx = self.alloc(value, self.head)?;
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;
        Ok(())
    }

    pub(crate) fn push_back(&mut self, value: T) -> Result<(), ListError> {
        let idx = self.alloc(value, None)?;
        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        Ok(())
    }

    pub(crate) fn front(&self) -> Option<&T> {
        self.head.map(|idx| &self.node(idx).value)
    }

    pub(crate) fn back(&self) -> Option<&T> {
        self.tail.map(|idx| &self.node(idx).value)
    }

    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        let node = self.release(head);
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        self.reset_if_empty();
        Some(node.value)
    }

    /// Removes the last element.
    ///
    /// Nodes have no back links, so finding the new tail walks the whole
    /// list from the head.
    pub(crate) fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        if self.head == Some(tail) {
            return self.pop_front();
        }

        let mut current = self.head?;
        while let Some(next) = self.node(current).next {
            if next == tail {
                break;
            }
            current = next;
        }

        self.node_mut(current).next = None;
        self.tail = Some(current);
        let node = self.release(tail);
        self.len -= 1;
        Some(node.value)
    }

    /// Detaches every element, leaving this list empty. Dropping the returned
    /// list drops the elements, head first.
    pub(crate) fn take(&mut self) -> Self {
        core::mem::replace(self, Self::new())
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    fn alloc(&mut self, value: T, next: Option<usize>) -> Result<usize, ListError> {
        let node = Slot::Occupied(Node { value, next });
        if let Some(idx) = self.free {
            let Slot::Vacant { next_free } = core::mem::replace(&mut self.slots[idx], node) else {
                unreachable!("free list points at an occupied slot");
            };
            self.free = next_free;
            return Ok(idx);
        }

        self.slots
            .try_reserve(1)
            .map_err(|_| ListError::ResourceExhausted)?;
        self.slots.push(node);
        Ok(self.slots.len() - 1)
    }

    fn release(&mut self, idx: usize) -> Node<T> {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match core::mem::replace(&mut self.slots[idx], vacant) {
            Slot::Occupied(node) => {
                self.free = Some(idx);
                node
            }
            Slot::Vacant { .. } => unreachable!("released a vacant slot"),
        }
    }

    fn reset_if_empty(&mut self) {
        if self.len == 0 {
            self.slots.clear();
            self.free = None;
        }
    }

    fn node(&self, idx: usize) -> &Node<T> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link points at a vacant slot"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("link points at a vacant slot"),
        }
    }

    /// Panics if the head/tail/length bookkeeping disagrees with the links.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.len == 0, self.head.is_none(), "len/head mismatch");
        assert_eq!(self.len == 0, self.tail.is_none(), "len/tail mismatch");
        if self.len == 1 {
            assert_eq!(self.head, self.tail, "single node must be head and tail");
        }

        let mut steps = 0;
        let mut last = None;
        let mut current = self.head;
        while let Some(idx) = current {
            assert!(steps < self.len, "walk exceeded len; cycle?");
            last = Some(idx);
            current = self.node(idx).next;
            steps += 1;
        }
        assert_eq!(steps, self.len, "reachable nodes != len");
        assert_eq!(last, self.tail, "walk did not end at tail");
    }
}

impl<T> Drop for RawList<T> {
    fn drop(&mut self) {
        while self.pop_front().is_some() {}
    }
}

/// Borrowing iterator over a [`RawList`], head to tail.
pub(crate) struct Iter<'a, T> {
    list: &'a RawList<T>,
    current: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.current?);
        self.current = node.next;
        Some(&node.value)
    }
}
