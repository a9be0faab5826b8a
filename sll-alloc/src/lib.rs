#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::as_conversions)]

extern crate alloc;

use core::{alloc::Layout, ptr::NonNull};

pub mod bump;
pub mod free_list;
pub mod global;
pub mod tracking;

pub use bump::Bump;
pub use free_list::FreeList;
pub use global::Global;
pub use tracking::{Stats, Tracking};

/// Source of raw memory for list nodes.
///
/// `alloc` signals failure with `None`; callers must not assume anything was
/// reserved in that case.
///
/// # Safety
///
/// A block returned by `alloc` must be valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and must not overlap any
/// other live block until it is passed back to `dealloc` with the same layout.
pub unsafe trait Allocator {
    /// # Safety
    ///
    /// `layout` must have a non-zero size unless the implementation says
    /// otherwise.
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<[u8]>>;

    /// # Safety
    ///
    /// `ptr` must come from a previous call to `alloc` on this allocator with the
    /// same `layout`, and must not have been deallocated since.
    unsafe fn dealloc(&mut self, ptr: *mut u8, layout: Layout);
}

unsafe impl<A: Allocator + ?Sized> Allocator for &mut A {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<[u8]>> {
        unsafe { (**self).alloc(layout) }
    }

    unsafe fn dealloc(&mut self, ptr: *mut u8, layout: Layout) {
        unsafe { (**self).dealloc(ptr, layout) }
    }
}
