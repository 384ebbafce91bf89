use armv6::{Alignable, PhysAddr};

use crate::{PAGE_ALIGN_BITS, PAGE_SIZE};

use core::ops;

pub mod alloc;
pub mod free_list;
pub mod mgmt;

/// Number of a physical page frame, counted from the start of memory.
/// The first page frame at physical address 0x0 has number zero.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone)]
pub struct PageFrame(pub usize);

impl PageFrame {
    /// Return the next page frame starting at or above the given physical address.
    pub fn next_above(addr: PhysAddr) -> PageFrame {
        PageFrame(addr.align_up(PAGE_SIZE).0 >> PAGE_ALIGN_BITS)
    }

    /// Return the page frame containing the given physical address.
    pub fn including(addr: PhysAddr) -> PageFrame {
        PageFrame(addr.align_down(PAGE_SIZE).0 >> PAGE_ALIGN_BITS)
    }

    pub fn start_address(&self) -> PhysAddr {
        PhysAddr(self.0 * PAGE_SIZE)
    }

    pub fn end_address(&self) -> PhysAddr {
        PhysAddr(self.0 * PAGE_SIZE + PAGE_SIZE)
    }
}

impl ops::Add<usize> for PageFrame {
    type Output = PageFrame;

    fn add(self, rhs: usize) -> PageFrame {
        PageFrame(self.0 + rhs)
    }
}

impl ops::AddAssign<usize> for PageFrame {
    fn add_assign(&mut self, rhs: usize) {
        self.0 += rhs;
    }
}

impl ops::Sub<usize> for PageFrame {
    type Output = PageFrame;

    fn sub(self, rhs: usize) -> PageFrame {
        PageFrame(self.0 - rhs)
    }
}
