use crate::physical::PageFrame;

pub mod freelist;

/// Generic interface for a page frame allocator.
pub trait PageFrameAllocator {
    /// Allocate a single page frame. Returns `None` when no frame is left,
    /// without changing any state.
    ///
    /// # Safety
    ///
    /// Implementations may write to the memory of the returned frame (for
    /// instance to scrub it); the caller must ensure the allocator's view
    /// of physical memory is still valid.
    unsafe fn alloc(&mut self) -> Option<PageFrame>;

    /// Free a single page frame previously allocated via `alloc`.
    ///
    /// # Safety
    ///
    /// The caller must pass only frames returned by `alloc` that have not
    /// been freed since, and must no longer touch the frame's memory.
    unsafe fn free(&mut self, frame: PageFrame);
}
