//! AArch64 support.

pub mod irq;

/// Data synchronization barrier.
///
/// Completes every outstanding memory access before the next instruction
/// executes. Required before ringing a doorbell that makes another bus
/// master read memory we just wrote.
#[inline(always)]
pub fn dsb() {
    unsafe {
        core::arch::asm!("dsb sy", options(nostack, preserves_flags));
    }
}

/// Data memory barrier.
///
/// Orders memory accesses before the barrier against those after it.
#[inline(always)]
pub fn dmb() {
    unsafe {
        core::arch::asm!("dmb sy", options(nostack, preserves_flags));
    }
}

/// Instruction synchronization barrier.
#[inline(always)]
pub fn isb() {
    unsafe {
        core::arch::asm!("isb", options(nostack, preserves_flags));
    }
}

/// Wait for interrupt (low-power idle).
#[inline(always)]
pub fn wfi() {
    unsafe {
        core::arch::asm!("wfi", options(nomem, nostack, preserves_flags));
    }
}

/// Single no-op, used to pace register sequences that ask for a number of
/// clock cycles between steps.
#[inline(always)]
pub fn nop() {
    unsafe {
        core::arch::asm!("nop", options(nomem, nostack, preserves_flags));
    }
}
