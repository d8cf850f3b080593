//! AArch64 boot and exception entry.

pub mod boot;
pub mod exception;

use common::arch::CpuIrq;
use common::sync::irq::IrqControl;

/// Mask IRQs and park the core for good.
pub fn halt() -> ! {
    let _ = CpuIrq::disable();
    loop {
        unsafe {
            core::arch::asm!("wfe", options(nomem, nostack, preserves_flags));
        }
    }
}
