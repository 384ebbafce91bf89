//! Newtype wrappers that make it harder to accidentally confuse physical and
//! virtual addresses. The kernel boots with the MMU off, so the two are
//! numerically equal at first, which makes mixing them up especially easy.

use core::fmt;
use core::ops;

use super::align::Alignable;

/// A physical address in RAM or in the MMIO window.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
#[repr(transparent)]
pub struct PhysAddr(pub usize);

/// A virtual address. Until the MMU is enabled this is an identity view of
/// physical memory.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
#[repr(transparent)]
pub struct VirtAddr(pub usize);

impl VirtAddr {
    /// Reinterpret the address as a pointer. The caller is responsible for
    /// the address actually being mapped and suitably aligned for `T`.
    pub unsafe fn as_ptr<T>(self) -> *const T {
        self.0 as *const T
    }

    pub unsafe fn as_mut_ptr<T>(self) -> *mut T {
        self.0 as *mut T
    }
}

macro_rules! impl_addr_arith {
    ($addr:tt) => {
        impl Alignable for $addr {
            type Alignment = usize;

            fn align_up(self, alignment: usize) -> Self {
                $addr(self.0.align_up(alignment))
            }

            fn align_down(self, alignment: usize) -> Self {
                $addr(self.0.align_down(alignment))
            }
        }

        impl ops::Add<usize> for $addr {
            type Output = $addr;

            fn add(self, other: usize) -> Self::Output {
                $addr(self.0 + other)
            }
        }

        impl ops::AddAssign<usize> for $addr {
            fn add_assign(&mut self, other: usize) {
                self.0 += other;
            }
        }

        impl ops::Sub<usize> for $addr {
            type Output = $addr;

            fn sub(self, other: usize) -> Self::Output {
                $addr(self.0 - other)
            }
        }
    };
}

impl_addr_arith!(PhysAddr);
impl_addr_arith!(VirtAddr);

impl fmt::Pointer for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PHYS_0x{:08x}", self.0)
    }
}

impl fmt::Pointer for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "VIRT_0x{:08x}", self.0)
    }
}
