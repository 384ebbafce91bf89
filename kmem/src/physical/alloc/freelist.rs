//! The page frame allocator used for all of physical memory.
//!
//! At boot every frame below the end of the kernel image is claimed for the
//! kernel and every remaining frame goes onto the free list, in ascending
//! order. Afterwards allocation pops from the front of the list and freeing
//! pushes back to the front, so a just-freed frame is the next one handed
//! out again.

use log::debug;

use armv6::{PhysAddr, VirtAddr};

use crate::mapping::DirectMapping;
use crate::physical::alloc::PageFrameAllocator;
use crate::physical::free_list::FreeList;
use crate::physical::mgmt::{PageFrameState, PageFrameTable};
use crate::physical::PageFrame;
use crate::{util, PAGE_ALIGN_BITS, PAGE_SIZE};

use core::cmp;

pub struct FreeListAllocator {
    table: PageFrameTable,
    free_list: FreeList,
    mapping: DirectMapping,
}

impl FreeListAllocator {
    /// Classify all frames of `table` and build the free list.
    ///
    /// Frames below `kernel_end` (rounded down to a page boundary, clamped
    /// to the table length in case the firmware reported less memory than
    /// the kernel image occupies) are marked as kernel-owned and identity
    /// mapped; everything above is linked into the free list.
    ///
    /// `mapping` must cover every frame of the table, it is used to reach
    /// page memory when scrubbing freshly allocated frames.
    pub fn new(mut table: PageFrameTable, mapping: DirectMapping, kernel_end: PhysAddr) -> FreeListAllocator {
        let total_frames = table.length();
        let kernel_frames = cmp::min(PageFrame::including(kernel_end).0, total_frames);

        for i in 0..kernel_frames {
            let frame = PageFrame(i);
            let entry = table.index_mut(i);
            entry.state = PageFrameState::Kernel;
            // identity map: the kernel runs with the MMU off
            entry.vaddr = VirtAddr(frame.start_address().0);
        }

        let mut free_list = FreeList::new();
        for i in kernel_frames..total_frames {
            free_list.push_back(&mut table, PageFrame(i));
        }

        debug!(
            "[kmem] {} frames total, {} kernel, {} free",
            total_frames,
            kernel_frames,
            free_list.len()
        );

        FreeListAllocator {
            table,
            free_list,
            mapping,
        }
    }

    /// Number of frames currently available for allocation.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    pub fn table(&self) -> &PageFrameTable {
        &self.table
    }

    /// Checked conversion from a physical address to the frame it denotes.
    /// Returns `None` for misaligned addresses and addresses outside the
    /// managed range.
    pub fn frame_at(&self, addr: PhysAddr) -> Option<PageFrame> {
        if addr.0 % PAGE_SIZE != 0 {
            return None;
        }
        let frame = PageFrame(addr.0 >> PAGE_ALIGN_BITS);
        if frame.0 < self.table.length() {
            Some(frame)
        } else {
            None
        }
    }
}

impl PageFrameAllocator for FreeListAllocator {
    unsafe fn alloc(&mut self) -> Option<PageFrame> {
        let frame = self.free_list.pop_front(&mut self.table)?;
        self.table.index_mut(frame.0).state = PageFrameState::Allocated;

        // A frame may still hold data from its previous owner; handing that
        // out would leak it to the new one.
        util::zero(self.mapping.phys_to_virt(frame.start_address()), PAGE_SIZE);

        Some(frame)
    }

    unsafe fn free(&mut self, frame: PageFrame) {
        let entry = self.table.index_mut(frame.0);
        assert!(
            entry.state == PageFrameState::Allocated,
            "freeing page frame {} which is not allocated",
            frame.0
        );
        entry.state = PageFrameState::Free;
        self.free_list.push_front(&mut self.table, frame);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::physical::mgmt::PageFrameInfo;

    /// An allocator over a host-allocated arena standing in for physical
    /// memory. `PhysAddr(0)` corresponds to the start of the arena.
    struct Harness {
        allocator: FreeListAllocator,
        arena: Vec<u8>,
        _table_buf: Vec<PageFrameInfo>,
    }

    fn setup(total_frames: usize, kernel_frames: usize) -> Harness {
        // dirty arena so tests can observe scrubbing
        let arena = vec![0xA5u8; total_frames * PAGE_SIZE];
        let mapping = DirectMapping::new(
            VirtAddr(arena.as_ptr() as usize),
            PhysAddr(0),
            total_frames * PAGE_SIZE,
        );
        let mut table_buf: Vec<PageFrameInfo> = Vec::with_capacity(total_frames);
        let table =
            unsafe { PageFrameTable::from_addr(VirtAddr(table_buf.as_mut_ptr() as usize), total_frames) };
        let allocator =
            FreeListAllocator::new(table, mapping, PhysAddr(kernel_frames * PAGE_SIZE));
        Harness {
            allocator,
            arena,
            _table_buf: table_buf,
        }
    }

    #[test]
    fn boot_classification() {
        let h = setup(16, 3);
        assert_eq!(h.allocator.free_count(), 13);

        let stats = h.allocator.table().stats();
        assert_eq!(stats.total_count, 16);
        assert_eq!(stats.kernel_count, 3);
        assert_eq!(stats.free_count, 13);
        assert_eq!(stats.allocated_count, 0);

        for i in 0..3 {
            let info = h.allocator.table().get(PageFrame(i));
            assert_eq!(info.state(), PageFrameState::Kernel);
            assert_eq!(info.vaddr(), VirtAddr(i * PAGE_SIZE));
        }
        for i in 3..16 {
            assert_eq!(h.allocator.table().get(PageFrame(i)).state(), PageFrameState::Free);
        }
    }

    #[test]
    fn allocates_in_ascending_order_and_reuses_freed_frame_first() {
        let mut h = setup(16, 3);

        let a = unsafe { h.allocator.alloc() }.unwrap();
        let b = unsafe { h.allocator.alloc() }.unwrap();
        assert_eq!(a, PageFrame(3));
        assert_eq!(b, PageFrame(4));
        assert_eq!(h.allocator.free_count(), 11);

        unsafe { h.allocator.free(a) };
        assert_eq!(h.allocator.free_count(), 12);

        // the just-freed frame comes back first
        let c = unsafe { h.allocator.alloc() }.unwrap();
        assert_eq!(c, PageFrame(3));
        assert_eq!(h.allocator.free_count(), 11);
    }

    #[test]
    fn alloc_free_alloc_roundtrip_returns_same_address() {
        let mut h = setup(8, 1);
        let frame = unsafe { h.allocator.alloc() }.unwrap();
        let addr = frame.start_address();
        unsafe { h.allocator.free(frame) };
        let again = unsafe { h.allocator.alloc() }.unwrap();
        assert_eq!(again.start_address(), addr);
    }

    #[test]
    fn allocated_pages_read_as_zero() {
        let mut h = setup(4, 1);
        let frame = unsafe { h.allocator.alloc() }.unwrap();
        let start = frame.start_address().0;
        assert!(h.arena[start..start + PAGE_SIZE].iter().all(|&b| b == 0));

        // scribble on the page, free it, and check the next allocation of
        // the same frame is scrubbed again
        h.arena[start..start + PAGE_SIZE]
            .iter_mut()
            .for_each(|b| *b = 0xEE);
        unsafe { h.allocator.free(frame) };
        let again = unsafe { h.allocator.alloc() }.unwrap();
        assert_eq!(again, frame);
        assert!(h.arena[start..start + PAGE_SIZE].iter().all(|&b| b == 0));
    }

    #[test]
    fn exhaustion_fails_cleanly() {
        let mut h = setup(6, 2);
        let mut frames = Vec::new();
        for _ in 0..4 {
            frames.push(unsafe { h.allocator.alloc() }.unwrap());
        }
        assert_eq!(h.allocator.free_count(), 0);
        assert!(unsafe { h.allocator.alloc() }.is_none());
        // failing once must not corrupt the allocator
        assert!(unsafe { h.allocator.alloc() }.is_none());

        unsafe { h.allocator.free(frames[1]) };
        assert_eq!(h.allocator.free_count(), 1);
        assert_eq!(unsafe { h.allocator.alloc() }, Some(frames[1]));
    }

    #[test]
    #[should_panic(expected = "not allocated")]
    fn double_free_panics() {
        let mut h = setup(4, 1);
        let frame = unsafe { h.allocator.alloc() }.unwrap();
        unsafe { h.allocator.free(frame) };
        unsafe { h.allocator.free(frame) };
    }

    #[test]
    #[should_panic(expected = "not allocated")]
    fn freeing_a_kernel_frame_panics() {
        let mut h = setup(4, 2);
        unsafe { h.allocator.free(PageFrame(0)) };
    }

    #[test]
    fn frame_at_validates_alignment_and_range() {
        let h = setup(4, 1);
        assert_eq!(h.allocator.frame_at(PhysAddr(0)), Some(PageFrame(0)));
        assert_eq!(h.allocator.frame_at(PhysAddr(3 * PAGE_SIZE)), Some(PageFrame(3)));
        assert_eq!(h.allocator.frame_at(PhysAddr(123)), None);
        assert_eq!(h.allocator.frame_at(PhysAddr(4 * PAGE_SIZE)), None);
    }

    #[test]
    fn zero_memory_yields_no_free_frames() {
        let mut h = setup(0, 0);
        assert_eq!(h.allocator.free_count(), 0);
        assert!(unsafe { h.allocator.alloc() }.is_none());
    }

    #[test]
    fn kernel_larger_than_memory_is_clamped() {
        // the kernel image boundary lies past the end of reported memory
        let arena = vec![0u8; 2 * PAGE_SIZE];
        let mapping = DirectMapping::new(
            VirtAddr(arena.as_ptr() as usize),
            PhysAddr(0),
            2 * PAGE_SIZE,
        );
        let mut table_buf: Vec<PageFrameInfo> = Vec::with_capacity(2);
        let table = unsafe { PageFrameTable::from_addr(VirtAddr(table_buf.as_mut_ptr() as usize), 2) };
        let mut allocator = FreeListAllocator::new(table, mapping, PhysAddr(5 * PAGE_SIZE));

        assert_eq!(allocator.free_count(), 0);
        assert_eq!(allocator.table().stats().kernel_count, 2);
        assert!(unsafe { allocator.alloc() }.is_none());
    }
}
