use core::{
    alloc::Layout,
    marker::PhantomData,
    ptr::{self, NonNull},
};

use ptr_ext::PtrExt;
use tracing::debug;

/// Hands out blocks from a borrowed region in address order.
///
/// Freed blocks are not reused individually; the whole region becomes
/// available again once every block has been returned.
///
/// The region is borrowed exclusively for `'a`, so two allocators can never
/// hand out the same bytes:
///
/// ```compile_fail
/// # use sll_alloc::Bump;
/// let mut region = [0u8; 64];
/// let a = Bump::new(&mut region);
/// let b = Bump::new(&mut region);
/// # drop((a, b));
/// ```
pub struct Bump<'a> {
    base: NonNull<u8>,
    len: usize,
    /// Offset of the first unused byte.
    used: usize,
    live: usize,
    _region: PhantomData<&'a mut [u8]>,
}

impl<'a> Bump<'a> {
    pub fn new(region: &'a mut [u8]) -> Bump<'a> {
        let len = region.len();
        Bump {
            base: NonNull::from(region).cast::<u8>(),
            len,
            used: 0,
            live: 0,
            _region: PhantomData,
        }
    }

    /// Number of blocks handed out and not yet returned.
    pub fn allocations(&self) -> usize {
        self.live
    }

    /// Bytes past the last block handed out.
    pub fn remaining(&self) -> usize {
        self.len - self.used
    }

    /// Offset range `start..end` a block for `layout` would occupy.
    fn fit(&self, layout: Layout) -> Option<(usize, usize)> {
        let base = self.base.as_ptr();
        let start = base
            .wrapping_add(self.used)
            .try_align_up(layout.align())?
            .addr()
            - base.addr();
        let end = start.checked_add(layout.size())?;
        (end <= self.len).then_some((start, end))
    }
}

unsafe impl super::Allocator for Bump<'_> {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<[u8]>> {
        let Some((start, end)) = self.fit(layout) else {
            debug!(
                size = layout.size(),
                remaining = self.remaining(),
                "bump region exhausted"
            );
            return None;
        };
        self.used = end;
        self.live += 1;
        // start <= len, so the block stays inside the borrowed region
        let block = self.base.as_ptr().wrapping_add(start);
        NonNull::new(ptr::slice_from_raw_parts_mut(block, layout.size()))
    }

    unsafe fn dealloc(&mut self, _ptr: *mut u8, _layout: Layout) {
        self.live = self.live.saturating_sub(1);
        if self.live == 0 {
            self.used = 0;
        }
    }
}
