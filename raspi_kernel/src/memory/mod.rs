//! Physical memory bring-up and the allocation interface exposed to the
//! rest of the kernel.

use log::info;

use armv6::{PhysAddr, VirtAddr};
use atags::Atags;
use kmem::mapping::DirectMapping;
use kmem::physical::alloc::freelist::FreeListAllocator;
use kmem::physical::alloc::PageFrameAllocator;
use kmem::physical::mgmt::PageFrameTable;
use kmem::PAGE_SIZE;

use crate::globals::PAGE_ALLOCATOR;

/// The linker script places `__end` just past the kernel image; everything
/// below it belongs to the kernel forever.
#[cfg(not(test))]
fn kernel_image_end() -> PhysAddr {
    extern "C" {
        static __end: u8;
    }
    PhysAddr(unsafe { &__end as *const u8 as usize })
}

// There is no linker script on the host, tests get a fixed load address.
#[cfg(test)]
fn kernel_image_end() -> PhysAddr {
    PhysAddr(0x8000)
}

/// Set up physical memory management. Must run to completion exactly once
/// before any call to [`alloc_page`] or [`free_page`].
///
/// The page frame table is placed directly after the kernel image and
/// sized from the memory size the firmware reported in the ATAG list.
///
/// # Panics
///
/// Panics when the ATAG list carries no memory entry (a board without
/// usable RAM is not worth booting on) and when called twice.
///
/// # Safety
///
/// `atags_addr` must point to the firmware-provided ATAG list, and the
/// memory it describes must be identity mapped and unused apart from the
/// kernel image.
pub unsafe fn init(atags_addr: VirtAddr) {
    let atags = Atags::from_addr(atags_addr);
    let mem_size = atags
        .mem()
        .map(|m| m.size())
        .expect("ATAG list does not report any memory");

    // a trailing fraction of a page is never managed
    let num_frames = mem_size / PAGE_SIZE;
    let kernel_end = kernel_image_end();

    let table = PageFrameTable::from_addr(VirtAddr(kernel_end.0), num_frames);
    let allocator = FreeListAllocator::new(table, DirectMapping::identity(mem_size), kernel_end);

    info!(
        "[mem] {} KiB of RAM, {} frames, {} free",
        mem_size / 1024,
        num_frames,
        allocator.free_count()
    );

    let mut guard = PAGE_ALLOCATOR.lock();
    assert!(guard.is_none(), "memory subsystem initialized twice");
    *guard = Some(allocator);
}

/// Allocate one page of physical memory. The returned address is page
/// aligned and the page reads as all zeros. Returns `None` when no free
/// page is left.
///
/// # Panics
///
/// Panics when called before [`init`] has completed.
pub fn alloc_page() -> Option<PhysAddr> {
    let mut guard = PAGE_ALLOCATOR.lock();
    let allocator = guard.as_mut().expect("memory subsystem not initialized");
    unsafe { allocator.alloc() }.map(|frame| frame.start_address())
}

/// Return a page previously obtained from [`alloc_page`] to the free pool.
///
/// # Panics
///
/// Panics when called before [`init`] has completed, when `addr` is
/// misaligned or outside the managed range, and when the page is not
/// currently allocated (double free).
pub fn free_page(addr: PhysAddr) {
    let mut guard = PAGE_ALLOCATOR.lock();
    let allocator = guard.as_mut().expect("memory subsystem not initialized");
    let frame = allocator
        .frame_at(addr)
        .expect("free_page: address is not a managed page");
    unsafe { allocator.free(frame) }
}

/// Number of pages currently available for allocation.
pub fn free_count() -> usize {
    let guard = PAGE_ALLOCATOR.lock();
    let allocator = guard.as_ref().expect("memory subsystem not initialized");
    allocator.free_count()
}
