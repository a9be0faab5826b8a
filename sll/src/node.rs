use core::{alloc::Layout, ptr::NonNull};

use sll_alloc::Allocator;

use crate::{Error, Result};

pub(crate) struct Node {
    pub(crate) value: i32,
    /// `None` terminates the chain.
    pub(crate) next: Option<Owned>,
}

pub(crate) const NODE_LAYOUT: Layout = Layout::new::<Node>();

/// Freshly allocated, not yet initialised node storage.
pub(crate) struct Slot(NonNull<Node>);

impl Slot {
    pub(crate) fn alloc_in<A: Allocator>(alloc: &mut A) -> Result<Slot> {
        // SAFETY: Node is not zero-sized
        let block = unsafe { alloc.alloc(NODE_LAYOUT) }.ok_or(Error::Alloc {
            size: NODE_LAYOUT.size(),
            align: NODE_LAYOUT.align(),
        })?;
        Ok(Slot(block.cast::<Node>()))
    }

    pub(crate) fn fill(self, node: Node) -> Owned {
        // SAFETY: the block is sized and aligned for a Node and nothing else
        // refers to it
        unsafe { self.0.as_ptr().write(node) };
        Owned(self.0)
    }
}

/// The sole owner of one live node.
///
/// Not `Clone`: every node is reachable through exactly one `Owned`, held
/// either by the list head or by the predecessor's `next`. Dropping an `Owned`
/// leaks the node; it must be consumed by [`Owned::release_in`].
#[must_use]
pub(crate) struct Owned(NonNull<Node>);

// SAFETY: an Owned is a unique handle to plain data
unsafe impl Send for Owned {}

impl Owned {
    pub(crate) fn get(&self) -> &Node {
        // SAFETY: the node was initialised by Slot::fill and is only freed by
        // release_in, which consumes self
        unsafe { self.0.as_ref() }
    }

    /// Moves the node out of its storage and frees the storage.
    ///
    /// # Safety
    ///
    /// `alloc` must be the allocator the node's slot came from.
    pub(crate) unsafe fn release_in<A: Allocator>(self, alloc: &mut A) -> Node {
        let node = unsafe { self.0.as_ptr().read() };
        unsafe { alloc.dealloc(self.0.cast::<u8>().as_ptr(), NODE_LAYOUT) };
        node
    }
}
