#![no_std]
#![no_main]

mod arch;
mod irq;
mod kcore;
mod logger;

use core::panic::PanicInfo;

use log::error;

#[unsafe(no_mangle)]
pub extern "C" fn kernel_main() -> ! {
    arch::aarch64::exception::install_vectors();

    if kcore::init::kernel_init().is_err() {
        // No console to report on.
        arch::aarch64::halt();
    }

    loop {
        common::arch::wfi();
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    error!("kernel panic: {info}");
    arch::aarch64::halt();
}
