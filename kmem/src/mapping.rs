//! Translation of physical to virtual addresses for a directly mapped
//! window of memory. While the MMU is off the whole of RAM is one identity
//! mapping; unit tests use a window based at a host-allocated arena instead.

use armv6::{PhysAddr, VirtAddr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMapping {
    virtual_base: VirtAddr,
    physical_base: PhysAddr,
    size_in_bytes: usize,
}

impl DirectMapping {
    pub const fn new(virtual_base: VirtAddr, physical_base: PhysAddr, size_in_bytes: usize) -> Self {
        DirectMapping {
            virtual_base,
            physical_base,
            size_in_bytes,
        }
    }

    /// The identity mapping covering the first `size_in_bytes` bytes of
    /// physical memory, as seen by the kernel before paging is enabled.
    pub const fn identity(size_in_bytes: usize) -> Self {
        DirectMapping::new(VirtAddr(0), PhysAddr(0), size_in_bytes)
    }

    /// The size of the mapped range in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }

    /// Returns whether the given physical address is part of this mapping.
    pub fn contains_phys(&self, phys_addr: PhysAddr) -> bool {
        phys_addr >= self.physical_base && phys_addr < self.physical_base + self.size_in_bytes
    }

    /// Translates a physical to a virtual address using the direct mapping.
    ///
    /// # Panics
    ///
    /// Panics if the given physical address is outside of the mapped range.
    pub fn phys_to_virt(&self, phys_addr: PhysAddr) -> VirtAddr {
        if !self.contains_phys(phys_addr) {
            panic!("[DirectMapping::phys_to_virt] physical address {:p} out of bounds", phys_addr);
        }
        VirtAddr(phys_addr.0 - self.physical_base.0 + self.virtual_base.0)
    }
}
