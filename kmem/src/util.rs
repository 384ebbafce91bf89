//! Low-level helpers for touching raw page memory.

use armv6::VirtAddr;

/// Overwrite `size` bytes starting at `addr` with zeros.
///
/// # Safety
///
/// The whole range must be mapped, writable and not referenced by anyone
/// else.
pub(crate) unsafe fn zero(addr: VirtAddr, size: usize) {
    let ptr: *mut u8 = addr.as_mut_ptr();
    core::ptr::write_bytes(ptr, 0, size);
}
