use core::fmt;

use sll_alloc::{Allocator, Global};

use crate::{
    node::{Node, Owned, Slot},
    Result,
};

/// A LIFO chain of `i32` nodes allocated from `A`.
///
/// There is no tail pointer; all mutation happens at the head.
pub struct List<A: Allocator = Global> {
    head: Option<Owned>,
    alloc: A,
}

impl List {
    /// Creates an empty list on the process heap.
    pub const fn new() -> Self {
        Self::new_in(Global)
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> List<A> {
    /// Creates an empty list whose nodes come from `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        Self { head: None, alloc }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of nodes in the chain.
    pub fn length(&self) -> usize {
        self.iter().count()
    }

    /// Number of nodes holding `value`.
    pub fn count(&self, value: i32) -> usize {
        self.iter().filter(|&v| v == value).count()
    }

    pub fn peek(&self) -> Option<i32> {
        self.head.as_ref().map(|head| head.get().value)
    }

    /// Prepends `value`.
    ///
    /// If the allocator cannot provide a node the list is left untouched and
    /// [`Error::Alloc`](crate::Error::Alloc) is returned.
    pub fn push(&mut self, value: i32) -> Result<()> {
        let slot = Slot::alloc_in(&mut self.alloc)?;
        let next = self.head.take();
        self.head = Some(slot.fill(Node { value, next }));
        Ok(())
    }

    /// Removes the head node and returns its value, or `None` if the list is
    /// empty.
    pub fn pop(&mut self) -> Option<i32> {
        let head = self.head.take()?;
        // SAFETY: every node in the chain came from self.alloc
        let node = unsafe { head.release_in(&mut self.alloc) };
        self.head = node.next;
        Some(node.value)
    }

    /// Releases every node, head first, leaving the list empty.
    pub fn free_list(&mut self) {
        let mut next = self.head.take();
        while let Some(owned) = next {
            // SAFETY: every node in the chain came from self.alloc
            next = unsafe { owned.release_in(&mut self.alloc) }.next;
        }
    }

    /// Values from head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_ref().map(Owned::get),
        }
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }
}

impl<A: Allocator> Drop for List<A> {
    fn drop(&mut self) {
        self.free_list();
    }
}

impl<A: Allocator> fmt::Debug for List<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, A: Allocator> IntoIterator for &'a List<A> {
    type Item = i32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl Iterator for Iter<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let node = self.next?;
        self.next = node.next.as_ref().map(Owned::get);
        Some(node.value)
    }
}
