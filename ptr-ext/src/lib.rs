#![no_std]

/// Alignment helpers for raw byte pointers.
pub trait PtrExt: Sized {
    /// Rounds the address up to the next multiple of `align`.
    ///
    /// Returns `None` if `align` is not a power of two or the rounded
    /// address does not fit in a `usize`.
    fn try_align_up(self, align: usize) -> Option<Self>;

    fn has_alignment(self, align: usize) -> bool;
}

impl PtrExt for *mut u8 {
    fn try_align_up(self, align: usize) -> Option<Self> {
        if !align.is_power_of_two() {
            return None;
        }
        Some(if self.has_alignment(align) {
            self
        } else {
            self.with_addr((self.addr() | (align - 1)).checked_add(1)?)
        })
    }

    fn has_alignment(self, align: usize) -> bool {
        align.is_power_of_two() && self.addr() & (align - 1) == 0
    }
}
