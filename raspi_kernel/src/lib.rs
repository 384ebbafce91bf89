#![cfg_attr(not(test), no_std)]

pub mod globals;
pub mod memory;

mod panic;

use armv6::VirtAddr;

/// This is the Rust entry point that the assembly boot stub jumps to with
/// the register state left by the firmware: `r0` is zero, `r1` the machine
/// type and `r2` the address of the ATAG list.
#[no_mangle]
pub extern "C" fn kernel_main(_r0: u32, _r1: u32, atags_addr: u32) -> ! {
    unsafe {
        memory::init(VirtAddr(atags_addr as usize));
    }

    loop {}
}
