#[cfg(not(test))]
use core::panic::PanicInfo;

/// There is nowhere to report the panic to before the console is brought
/// up, so all that is left to do is hang the board.
#[cfg(not(test))]
#[panic_handler]
fn panic(_panic_info: &PanicInfo) -> ! {
    loop {}
}
