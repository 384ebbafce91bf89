//! Bookkeeping for every physical page frame in the system.
//!
//! The table lives in a raw chunk of memory carved out right after the
//! kernel image, long before any heap exists, so it manages its backing
//! storage through a raw pointer instead of an allocation.

use crate::physical::PageFrame;

use core::mem;

use armv6::VirtAddr;

/// State of a single page frame. Using one enumeration instead of separate
/// `allocated`/`kernel` flags makes the impossible combination (a kernel
/// page that is not allocated) unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFrameState {
    /// Available for allocation, linked into the free list.
    Free,
    /// Permanently owned by the kernel image, never enters the free list.
    Kernel,
    /// Handed out by the allocator, owned by the caller until freed.
    Allocated,
}

/// Per-frame metadata: current state, the virtual address the frame is
/// mapped at, and the intrusive free-list links. The links are table
/// indices rather than pointers, which keeps the table position
/// independent and the link validity trivially checkable.
pub struct PageFrameInfo {
    pub(crate) state: PageFrameState,
    pub(crate) vaddr: VirtAddr,
    pub(crate) next_free: Option<PageFrame>,
    pub(crate) prev_free: Option<PageFrame>,
}

impl PageFrameInfo {
    pub(crate) fn free() -> PageFrameInfo {
        PageFrameInfo {
            state: PageFrameState::Free,
            vaddr: VirtAddr(0),
            next_free: None,
            prev_free: None,
        }
    }

    pub fn state(&self) -> PageFrameState {
        self.state
    }

    pub fn vaddr(&self) -> VirtAddr {
        self.vaddr
    }
}

// One entry per frame adds up quickly; keep an eye on the entry size.
const_assert!(mem::size_of::<PageFrameInfo>() <= 64);

/// The table holding one `PageFrameInfo` per physical page frame, indexed
/// by frame number.
pub struct PageFrameTable {
    ptr: *mut PageFrameInfo,
    length: usize,
}

// The table is only ever accessed by the boot CPU; there is no other core
// or interrupt context running while it exists.
unsafe impl Send for PageFrameTable {}

impl PageFrameTable {
    /// Required number of bytes for holding a page frame table for at most
    /// `num_page_frames` page frames.
    pub fn required_size_bytes(num_page_frames: usize) -> usize {
        num_page_frames * mem::size_of::<PageFrameInfo>()
    }

    /// Create a `PageFrameTable` at the given location and initialize all
    /// entries as free with cleared links.
    ///
    /// # Safety
    ///
    /// `addr` must point to at least `required_size_bytes(num_page_frames)`
    /// bytes of writable memory, suitably aligned for `PageFrameInfo`, that
    /// stays exclusively owned by the returned table.
    pub unsafe fn from_addr(addr: VirtAddr, num_page_frames: usize) -> PageFrameTable {
        let ptr: *mut PageFrameInfo = addr.as_mut_ptr();
        for i in 0..num_page_frames {
            ptr.add(i).write(PageFrameInfo::free());
        }
        PageFrameTable {
            ptr,
            length: num_page_frames,
        }
    }

    /// Number of page frames tracked by this table.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn get(&self, frame: PageFrame) -> &PageFrameInfo {
        self.index(frame.0)
    }

    pub(crate) fn index(&self, idx: usize) -> &PageFrameInfo {
        assert!(idx < self.length, "page frame index out of bounds");
        unsafe { &*self.ptr.add(idx) }
    }

    pub(crate) fn index_mut(&mut self, idx: usize) -> &mut PageFrameInfo {
        assert!(idx < self.length, "page frame index out of bounds");
        unsafe { &mut *self.ptr.add(idx) }
    }

    pub fn stats(&self) -> PageFrameStats {
        let (mut kernel, mut allocated, mut free) = (0, 0, 0);
        for i in 0..self.length {
            match self.index(i).state {
                PageFrameState::Kernel => kernel += 1,
                PageFrameState::Allocated => allocated += 1,
                PageFrameState::Free => free += 1,
            }
        }
        PageFrameStats {
            total_count: self.length,
            kernel_count: kernel,
            allocated_count: allocated,
            free_count: free,
        }
    }
}

/// Statistics about the page frame table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFrameStats {
    pub total_count: usize,
    pub kernel_count: usize,
    pub allocated_count: usize,
    pub free_count: usize,
}
