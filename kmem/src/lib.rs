#![cfg_attr(not(test), no_std)]

//! Physical memory management: the page frame table, the intrusive free
//! list threaded through it, and the page frame allocator built on both.

#[macro_use]
extern crate static_assertions;

extern crate armv6;

pub mod mapping;
pub mod physical;

mod util;

/// Number of trailing zeros in a page aligned address.
pub const PAGE_ALIGN_BITS: u32 = 12;

/// Size of a physical page, 4096 bytes.
pub const PAGE_SIZE: usize = 1 << PAGE_ALIGN_BITS;
