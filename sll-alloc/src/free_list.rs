use core::{
    alloc::Layout,
    mem,
    ptr::{self, addr_of_mut, NonNull},
};

use ptr_ext::PtrExt;
use tracing::debug;

// based off https://os.phil-opp.com/allocator-designs/#linked-list-allocator

/// First-fit allocator over a list of free regions.
pub struct FreeList {
    head: Option<NonNull<Region>>,
}

impl FreeList {
    /// Creates a FreeList with no memory to hand out.
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// Smallest region `add_free_region` accepts.
    pub const MIN_REGION: usize = mem::size_of::<Region>();

    /// Alignment `add_free_region` requires.
    pub const REGION_ALIGN: usize = mem::align_of::<Region>();

    /// Adds the given memory region to the front of the list.
    ///
    /// # Safety
    ///
    /// The region must be valid for reads and writes, unused by anything else,
    /// and stay so for as long as this allocator is in use.
    pub unsafe fn add_free_region(&mut self, region: NonNull<[u8]>) {
        assert!(region.cast::<u8>().as_ptr().has_alignment(Self::REGION_ALIGN));
        assert!(region.len() >= Self::MIN_REGION);

        let header = region.cast::<Region>();
        unsafe {
            header.as_ptr().write(Region {
                size: region.len(),
                next: self.head,
            });
        }
        self.head = Some(header);
    }

    /// Total bytes currently sitting in free regions.
    pub fn free_bytes(&self) -> usize {
        let mut total = 0;
        let mut next = self.head;
        while let Some(region) = next {
            // SAFETY: every linked region header was written by add_free_region
            let region = unsafe { region.as_ref() };
            total += region.size;
            next = region.next;
        }
        total
    }

    /// Unlinks the first region that can hold `layout` and splits it.
    fn take_fit(&mut self, layout: Layout) -> Option<Split> {
        let mut link: *mut Option<NonNull<Region>> = addr_of_mut!(self.head);
        // SAFETY: link points either at self.head or at the next field of a
        // live region header
        while let Some(region) = unsafe { *link } {
            if let Some(split) = Region::split(region, layout) {
                unsafe { *link = region.as_ref().next };
                return Some(split);
            }
            link = unsafe { addr_of_mut!((*region.as_ptr()).next) };
        }
        None
    }

    /// Rounds `layout` up so a freed block can hold a `Region` header.
    fn adjust(layout: Layout) -> Option<Layout> {
        let layout = layout.align_to(Self::REGION_ALIGN).ok()?.pad_to_align();
        Layout::from_size_align(Ord::max(layout.size(), Self::MIN_REGION), layout.align()).ok()
    }
}

impl Default for FreeList {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl super::Allocator for FreeList {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<[u8]>> {
        let layout = FreeList::adjust(layout)?;
        let Some(split) = self.take_fit(layout) else {
            debug!(size = layout.size(), free = self.free_bytes(), "no free region fits");
            return None;
        };
        if let Some(rest) = split.rest {
            // SAFETY: rest is the unused tail of a region this list owned
            unsafe { self.add_free_region(rest) };
        }
        Some(split.block)
    }

    unsafe fn dealloc(&mut self, ptr: *mut u8, layout: Layout) {
        // layouts that cannot be adjusted were never handed out
        let Some(layout) = FreeList::adjust(layout) else {
            return;
        };
        if let Some(block) = NonNull::new(ptr::slice_from_raw_parts_mut(ptr, layout.size())) {
            unsafe { self.add_free_region(block) };
        }
    }
}

/// Header written at the start of every free region; `size` counts the
/// header itself.
struct Region {
    size: usize,
    next: Option<NonNull<Region>>,
}

/// A region cut into an allocated block and an optional free tail.
struct Split {
    block: NonNull<[u8]>,
    rest: Option<NonNull<[u8]>>,
}

impl Region {
    /// Places `layout` at the first aligned offset of `this`. Fails if it does
    /// not fit, or if the tail left over would be too small for a header.
    fn split(this: NonNull<Region>, layout: Layout) -> Option<Split> {
        let base = this.cast::<u8>().as_ptr();
        // SAFETY: this is a live region header
        let size = unsafe { this.as_ref().size };
        let start = base.try_align_up(layout.align())?.addr() - base.addr();
        let end = start.checked_add(layout.size())?;
        let tail = size.checked_sub(end)?;
        if 0 < tail && tail < FreeList::MIN_REGION {
            return None;
        }

        let block = NonNull::new(ptr::slice_from_raw_parts_mut(
            base.wrapping_add(start),
            layout.size(),
        ))?;
        let rest = (tail > 0)
            .then(|| NonNull::new(ptr::slice_from_raw_parts_mut(base.wrapping_add(end), tail)))
            .flatten();
        Some(Split { block, rest })
    }
}
