#![cfg_attr(not(test), no_std)]
//! Parser for the ATAG list provided by the firmware before the kernel runs.
//! The bootloader assembles the list at a fixed address and passes that
//! address to the kernel in `r2`. The data outlives all kernel code and is
//! never written to, so the references handed out here are `'static`.
//!
//! Each entry starts with a header of two 32-bit words: the entry size in
//! 4-byte units (including the header itself) and the tag identifier. The
//! next entry is found by advancing `size * 4` bytes; a `NONE` tag terminates
//! the list.
//!
//! The safety of this parser depends on the bootloader following that
//! convention. If the firmware hands over a bogus list, walking it ends in
//! sadness.

#[macro_use]
extern crate bitflags;

use armv6::{PhysAddr, VirtAddr};

use core::iter::{FusedIterator, Iterator};
use core::mem;
use core::slice;
use core::str;

/// Read-only view of the boot-provided ATAG list.
pub struct Atags {
    first: *const TagHeader,
}

impl Atags {
    /// Construct a view of the list starting at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must point to a well-formed, `NONE`-terminated ATAG list that
    /// stays mapped for the lifetime of the kernel.
    pub unsafe fn from_addr(addr: VirtAddr) -> Atags {
        Atags {
            first: addr.as_ptr(),
        }
    }

    /// Iterate over all entries up to (not including) the `NONE` terminator.
    pub fn tags(&self) -> TagsIter {
        TagsIter {
            current: self.first,
        }
    }

    pub fn core(&self) -> Option<&'static CoreTag> {
        self.tags()
            .find(|t| t.id() == TagId::CORE)
            .map(|t| t as *const TagHeader)
            .map(|t| unsafe { &*(t as *const CoreTag) })
    }

    /// The first memory-region entry, if the firmware reported one.
    /// Additional `MEM` entries are ignored.
    pub fn mem(&self) -> Option<&'static MemTag> {
        self.tags()
            .find(|t| t.id() == TagId::MEM)
            .map(|t| t as *const TagHeader)
            .map(|t| unsafe { &*(t as *const MemTag) })
    }

    pub fn initrd(&self) -> Option<&'static InitrdTag> {
        self.tags()
            .find(|t| t.id() == TagId::INITRD2)
            .map(|t| t as *const TagHeader)
            .map(|t| unsafe { &*(t as *const InitrdTag) })
    }

    pub fn cmd_line(&self) -> Option<&'static str> {
        self.tags()
            .find(|t| t.id() == TagId::CMDLINE)
            .map(|t| t as *const TagHeader)
            .map(|t| unsafe { &*(t as *const CmdLineTag) })
            .map(|t| t.line())
    }

    /// Total physical memory in bytes, or 0 when the firmware did not report
    /// a memory region. Callers that can distinguish "no memory" from "not
    /// reported" should use [`Atags::mem`] instead.
    pub fn mem_size(&self) -> usize {
        self.mem().map(|m| m.size()).unwrap_or(0)
    }
}

/// Common header shared by all ATAG entries.
#[repr(C)]
pub struct TagHeader {
    size: u32,
    id: TagId,
}

impl TagHeader {
    pub fn id(&self) -> TagId {
        self.id
    }

    /// Entry size in 4-byte words, including this header.
    pub fn size_words(&self) -> usize {
        self.size as usize
    }

    pub fn size_bytes(&self) -> usize {
        self.size as usize * 4
    }

    unsafe fn next(&self) -> *const TagHeader {
        let words = self as *const TagHeader as *const u32;
        words.add(self.size_words()) as *const TagHeader
    }
}

/// Identifier of an ATAG entry kind.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
#[repr(transparent)]
pub struct TagId(u32);

impl TagId {
    /// Terminates the list.
    pub const NONE: TagId = TagId(0x0000_0000);
    /// First entry of every list.
    pub const CORE: TagId = TagId(0x5441_0001);
    /// A region of physical memory.
    pub const MEM: TagId = TagId(0x5441_0002);
    /// Location of the initial ramdisk.
    pub const INITRD2: TagId = TagId(0x5442_0005);
    /// Kernel command line from `cmdline.txt`.
    pub const CMDLINE: TagId = TagId(0x5441_0009);
}

/// An iterator over the entries of an ATAG list.
/// Construct using `Atags::tags`.
pub struct TagsIter {
    current: *const TagHeader,
}

impl Iterator for TagsIter {
    type Item = &'static TagHeader;

    fn next(&mut self) -> Option<Self::Item> {
        unsafe {
            let this = &*self.current;
            if this.id() == TagId::NONE {
                None
            } else {
                self.current = this.next();
                Some(this)
            }
        }
    }
}

impl FusedIterator for TagsIter {}

bitflags! {
    /// Flag word of the `CORE` entry.
    pub struct CoreFlags: u32 {
        const READ_ONLY = 0b1;
    }
}

/// The `CORE` entry heading the list.
#[repr(C)]
pub struct CoreTag {
    header: TagHeader,
    flags: u32,
    page_size: u32,
    root_dev: u32,
}

impl CoreTag {
    pub fn flags(&self) -> CoreFlags {
        CoreFlags::from_bits_truncate(self.flags)
    }

    pub fn page_size(&self) -> usize {
        self.page_size as usize
    }

    pub fn root_dev(&self) -> u32 {
        self.root_dev
    }
}

/// A `MEM` entry describing one region of physical memory.
#[repr(C)]
pub struct MemTag {
    header: TagHeader,
    size: u32,
    start: u32,
}

impl MemTag {
    /// Size of the region in bytes.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Physical address where the region begins.
    pub fn start(&self) -> PhysAddr {
        PhysAddr(self.start as usize)
    }
}

/// An `INITRD2` entry pointing at the initial ramdisk.
#[repr(C)]
pub struct InitrdTag {
    header: TagHeader,
    start: u32,
    size: u32,
}

impl InitrdTag {
    pub fn start(&self) -> PhysAddr {
        PhysAddr(self.start as usize)
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }
}

/// A `CMDLINE` entry carrying the NUL-terminated kernel command line.
#[repr(C)]
pub struct CmdLineTag {
    header: TagHeader,
    /// First byte of the command line. The string is NUL-terminated, so it
    /// always consists of at least one byte.
    line_start: u8,
}

impl CmdLineTag {
    /// Return the command line stored in the entry, without the trailing
    /// NUL and any padding after it.
    ///
    /// # Panics
    ///
    /// Panics when the stored bytes are not valid UTF-8.
    pub fn line(&self) -> &str {
        assert!(self.header.size_bytes() >= mem::size_of::<TagHeader>());
        let max_len = self.header.size_bytes() - mem::size_of::<TagHeader>();
        let line_ptr = &self.line_start as *const u8;
        unsafe {
            let raw = slice::from_raw_parts(line_ptr, max_len);
            let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            str::from_utf8(&raw[..len]).expect("invalid UTF-8 in ATAG command line")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Builds a binary ATAG list out of (tag id, payload words) pairs,
    /// terminated by `NONE`.
    fn build_list(entries: &[(u32, &[u32])]) -> Vec<u32> {
        let mut words = Vec::new();
        for (id, payload) in entries {
            words.push(2 + payload.len() as u32);
            words.push(*id);
            words.extend_from_slice(payload);
        }
        words.push(0);
        words.push(0x0000_0000);
        words
    }

    fn atags_of(words: &[u32]) -> Atags {
        unsafe { Atags::from_addr(VirtAddr(words.as_ptr() as usize)) }
    }

    #[test]
    fn mem_size_found_between_other_tags() {
        let words = build_list(&[
            (0x5441_0001, &[1, 4096, 0x00FF]),       // CORE
            (0x5442_0005, &[0x0800_0000, 0x1000]),   // INITRD2
            (0x5441_0002, &[0x1000_0000, 0]),        // MEM: 256 MiB at 0
        ]);
        let atags = atags_of(&words);
        assert_eq!(atags.mem_size(), 0x1000_0000);
        let mem = atags.mem().unwrap();
        assert_eq!(mem.size(), 0x1000_0000);
        assert_eq!(mem.start(), PhysAddr(0));
    }

    #[test]
    fn first_mem_entry_wins() {
        let words = build_list(&[
            (0x5441_0002, &[0x0400_0000, 0]),
            (0x5441_0002, &[0x0800_0000, 0x0400_0000]),
        ]);
        let atags = atags_of(&words);
        assert_eq!(atags.mem_size(), 0x0400_0000);
    }

    #[test]
    fn missing_mem_entry_yields_none_and_zero() {
        let words = build_list(&[(0x5441_0001, &[1, 4096, 0x00FF])]);
        let atags = atags_of(&words);
        assert!(atags.mem().is_none());
        assert_eq!(atags.mem_size(), 0);
    }

    #[test]
    fn empty_list_has_no_tags() {
        let words = build_list(&[]);
        let atags = atags_of(&words);
        assert_eq!(atags.tags().count(), 0);
        assert_eq!(atags.mem_size(), 0);
    }

    #[test]
    fn unknown_tags_are_skipped_by_size() {
        let words = build_list(&[
            (0xDEAD_BEEF, &[1, 2, 3, 4, 5, 6, 7]),
            (0x5441_0002, &[0x0100_0000, 0]),
        ]);
        let atags = atags_of(&words);
        assert_eq!(atags.tags().count(), 2);
        assert_eq!(atags.mem_size(), 0x0100_0000);
    }

    #[test]
    fn core_tag_flags_and_page_size() {
        let words = build_list(&[(0x5441_0001, &[1, 4096, 0x00FF])]);
        let core = atags_of(&words).core().unwrap();
        assert!(core.flags().contains(CoreFlags::READ_ONLY));
        assert_eq!(core.page_size(), 4096);
        assert_eq!(core.root_dev(), 0x00FF);
    }

    #[test]
    fn initrd_tag_payload() {
        let words = build_list(&[(0x5442_0005, &[0x0800_0000, 0x0002_0000])]);
        let initrd = atags_of(&words).initrd().unwrap();
        assert_eq!(initrd.start(), PhysAddr(0x0800_0000));
        assert_eq!(initrd.size(), 0x0002_0000);
    }

    #[test]
    fn cmd_line_is_trimmed_at_nul() {
        // "console=ttyAMA0\0" packed into little-endian words
        let text = b"console=ttyAMA0\0";
        let mut payload = Vec::new();
        for chunk in text.chunks(4) {
            let mut bytes = [0u8; 4];
            bytes[..chunk.len()].copy_from_slice(chunk);
            payload.push(u32::from_ne_bytes(bytes));
        }
        let words = build_list(&[(0x5441_0009, &payload)]);
        let atags = atags_of(&words);
        assert_eq!(atags.cmd_line(), Some("console=ttyAMA0"));
    }
}
