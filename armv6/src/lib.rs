#![cfg_attr(not(test), no_std)]

//! Low-level support types for the ARMv6 board: address newtypes and
//! alignment arithmetic shared by the rest of the kernel.

mod addr;
mod align;

pub use self::addr::*;
pub use self::align::*;
