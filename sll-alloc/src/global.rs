use core::{
    alloc::Layout,
    ptr::{self, NonNull},
};

use tracing::debug;

/// The process heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct Global;

unsafe impl super::Allocator for Global {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<[u8]>> {
        if layout.size() == 0 {
            // zero-sized blocks never touch the heap
            let dangling = ptr::null_mut::<u8>().with_addr(layout.align());
            return NonNull::new(ptr::slice_from_raw_parts_mut(dangling, 0));
        }
        // SAFETY: layout has a non-zero size
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        if ptr.is_null() {
            debug!(size = layout.size(), align = layout.align(), "heap allocation failed");
            return None;
        }
        NonNull::new(ptr::slice_from_raw_parts_mut(ptr, layout.size()))
    }

    unsafe fn dealloc(&mut self, ptr: *mut u8, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        unsafe { alloc::alloc::dealloc(ptr, layout) }
    }
}

#[cfg(test)]
mod tests {
    use core::alloc::Layout;

    use super::Global;
    use crate::Allocator as _;

    #[test]
    fn test() {
        let layout = Layout::new::<[u64; 4]>();
        let mut global = Global;
        unsafe {
            let block = global.alloc(layout).unwrap();
            assert_eq!(block.len(), layout.size());
            let p = block.cast::<u8>().as_ptr();
            assert_eq!(p.addr() % layout.align(), 0);
            p.write_bytes(0xa5, layout.size());
            assert_eq!(*p.add(layout.size() - 1), 0xa5);
            global.dealloc(p, layout);
        }
    }

    #[test]
    fn zero_sized() {
        let layout = Layout::new::<[u64; 0]>();
        let mut global = Global;
        unsafe {
            let block = global.alloc(layout).unwrap();
            assert_eq!(block.len(), 0);
            assert_eq!(block.cast::<u8>().as_ptr().addr(), layout.align());
            global.dealloc(block.cast::<u8>().as_ptr(), layout);
        }
    }
}
