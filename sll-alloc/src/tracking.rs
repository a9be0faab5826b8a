use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use tracing::debug;

/// Counters collected by [`Tracking`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Allocations that returned a block.
    pub allocs: usize,
    /// Allocations that returned `None`, injected or not.
    pub failed_allocs: usize,
    pub deallocs: usize,
    /// Blocks handed out and not yet returned. Survives
    /// [`Tracking::reset_stats`].
    pub live: usize,
}

/// Wraps an allocator, counting calls and optionally refusing every
/// allocation.
///
/// The counters and the failure switch sit behind `Cell`s so they can be read
/// and flipped through a shared reference while a list owns the allocator.
#[derive(Debug, Default)]
pub struct Tracking<A> {
    inner: A,
    stats: Cell<Stats>,
    failing: Cell<bool>,
}

impl<A> Tracking<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            stats: Cell::new(Stats::default()),
            failing: Cell::new(false),
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats.get()
    }

    /// Zeroes the call counters. `live` keeps counting blocks that are still
    /// out.
    pub fn reset_stats(&self) {
        let live = self.stats.get().live;
        self.stats.set(Stats {
            live,
            ..Stats::default()
        });
    }

    /// While set, `alloc` returns `None` without asking the inner allocator.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn is_failing(&self) -> bool {
        self.failing.get()
    }

    /// Runs `f` with allocations failing, restoring the previous setting
    /// afterwards, also when `f` unwinds.
    pub fn failing<R>(&self, f: impl FnOnce() -> R) -> R {
        let _restore = Restore {
            failing: &self.failing,
            previous: self.failing.replace(true),
        };
        f()
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn record(&self, update: impl FnOnce(&mut Stats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

struct Restore<'a> {
    failing: &'a Cell<bool>,
    previous: bool,
}

impl Drop for Restore<'_> {
    fn drop(&mut self) {
        self.failing.set(self.previous);
    }
}

unsafe impl<A: super::Allocator> super::Allocator for Tracking<A> {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<[u8]>> {
        if self.failing.get() {
            debug!(size = layout.size(), "injected allocation failure");
            self.record(|stats| stats.failed_allocs += 1);
            return None;
        }
        let block = unsafe { self.inner.alloc(layout) };
        match block {
            Some(_) => self.record(|stats| {
                stats.allocs += 1;
                stats.live += 1;
            }),
            None => self.record(|stats| stats.failed_allocs += 1),
        }
        block
    }

    unsafe fn dealloc(&mut self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) };
        self.record(|stats| {
            stats.deallocs += 1;
            stats.live = stats.live.saturating_sub(1);
        });
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::alloc::Layout;
    use std::panic::{self, AssertUnwindSafe};

    use static_assertions::assert_not_impl_any;

    use super::{Stats, Tracking};
    use crate::{Allocator as _, Bump, Global};

    assert_not_impl_any!(Tracking<Global>: Sync);

    #[test]
    fn counts_calls() {
        let layout = Layout::new::<u64>();
        let mut alloc = Tracking::new(Global);
        unsafe {
            let p1 = alloc.alloc(layout).unwrap();
            let p2 = alloc.alloc(layout).unwrap();
            alloc.dealloc(p1.cast::<u8>().as_ptr(), layout);
            assert_eq!(
                alloc.stats(),
                Stats {
                    allocs: 2,
                    failed_allocs: 0,
                    deallocs: 1,
                    live: 1,
                }
            );
            alloc.dealloc(p2.cast::<u8>().as_ptr(), layout);
        }
        assert_eq!(alloc.stats().live, 0);
        alloc.reset_stats();
        assert_eq!(alloc.stats(), Stats::default());
    }

    #[test]
    fn reset_keeps_live_blocks() {
        let layout = Layout::new::<u64>();
        let mut alloc = Tracking::new(Global);
        unsafe {
            let block = alloc.alloc(layout).unwrap();
            alloc.reset_stats();
            assert_eq!(alloc.stats().allocs, 0);
            assert_eq!(alloc.stats().live, 1);
            alloc.dealloc(block.cast::<u8>().as_ptr(), layout);
        }
        assert_eq!(
            alloc.stats(),
            Stats {
                allocs: 0,
                failed_allocs: 0,
                deallocs: 1,
                live: 0,
            }
        );
    }

    #[test]
    fn injected_failure() {
        let layout = Layout::new::<u64>();
        let mut alloc = Tracking::new(Global);
        alloc.set_failing(true);
        assert!(unsafe { alloc.alloc(layout) }.is_none());
        alloc.set_failing(false);
        let block = unsafe { alloc.alloc(layout) }.unwrap();
        unsafe { alloc.dealloc(block.cast::<u8>().as_ptr(), layout) };
        assert_eq!(alloc.stats().failed_allocs, 1);
        assert_eq!(alloc.stats().allocs, 1);
    }

    #[test]
    fn failing_scope_restores() {
        let alloc = Tracking::new(Global);
        alloc.failing(|| assert!(alloc.is_failing()));
        assert!(!alloc.is_failing());

        alloc.set_failing(true);
        alloc.failing(|| ());
        assert!(alloc.is_failing());
    }

    #[test]
    fn failing_scope_restores_on_panic() {
        let alloc = Tracking::new(Global);
        let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
            alloc.failing::<()>(|| panic!("inside failing scope"));
        }));
        assert!(unwound.is_err());
        assert!(!alloc.is_failing());
    }

    #[test]
    fn inner_failure_is_counted() {
        #[repr(align(8))]
        struct MemPool([u8; 8]);
        let mut heap = MemPool([0; 8]);
        let mut alloc = Tracking::new(Bump::new(&mut heap.0));
        let layout = Layout::new::<u64>();
        unsafe {
            let block = alloc.alloc(layout).unwrap();
            assert!(alloc.alloc(layout).is_none());
            assert_eq!(alloc.inner().allocations(), 1);
            alloc.dealloc(block.cast::<u8>().as_ptr(), layout);
        }
        assert_eq!(
            alloc.stats(),
            Stats {
                allocs: 1,
                failed_allocs: 1,
                deallocs: 1,
                live: 0,
            }
        );
    }
}
