//! EL1 exception vectors.
//!
//! The kernel runs at EL1h, so only the "current EL with SP_ELx" IRQ and FIQ
//! slots lead anywhere useful. They save the caller-saved registers plus
//! `ELR_EL1`/`SPSR_EL1`, call into Rust and `eret`. Every other slot reports
//! the exception class and halts through the panic handler.

use core::arch::global_asm;

global_asm!(
    r#"
.macro SAVE_CONTEXT
    sub     sp, sp, #192
    stp     x0, x1, [sp, #0]
    stp     x2, x3, [sp, #16]
    stp     x4, x5, [sp, #32]
    stp     x6, x7, [sp, #48]
    stp     x8, x9, [sp, #64]
    stp     x10, x11, [sp, #80]
    stp     x12, x13, [sp, #96]
    stp     x14, x15, [sp, #112]
    stp     x16, x17, [sp, #128]
    stp     x18, x29, [sp, #144]
    mrs     x0, elr_el1
    stp     x30, x0, [sp, #160]
    mrs     x0, spsr_el1
    str     x0, [sp, #176]
.endm

.macro RESTORE_CONTEXT
    ldr     x0, [sp, #176]
    msr     spsr_el1, x0
    ldp     x30, x0, [sp, #160]
    msr     elr_el1, x0
    ldp     x18, x29, [sp, #144]
    ldp     x16, x17, [sp, #128]
    ldp     x14, x15, [sp, #112]
    ldp     x12, x13, [sp, #96]
    ldp     x10, x11, [sp, #80]
    ldp     x8, x9, [sp, #64]
    ldp     x6, x7, [sp, #48]
    ldp     x4, x5, [sp, #32]
    ldp     x2, x3, [sp, #16]
    ldp     x0, x1, [sp, #0]
    add     sp, sp, #192
.endm

.macro HANDLED_VECTOR entry
.balign 0x80
    SAVE_CONTEXT
    bl      \entry
    RESTORE_CONTEXT
    eret
.endm

.macro UNHANDLED_VECTOR kind
.balign 0x80
    mov     x0, #\kind
    mrs     x1, esr_el1
    mrs     x2, elr_el1
    b       unhandled_exception_rust
.endm

.section .text.vectors, "ax"
.balign 0x800
.global __exception_vectors
__exception_vectors:
    UNHANDLED_VECTOR 0
    UNHANDLED_VECTOR 1
    UNHANDLED_VECTOR 2
    UNHANDLED_VECTOR 3

    UNHANDLED_VECTOR 4
    HANDLED_VECTOR irq_entry_rust
    HANDLED_VECTOR fiq_entry_rust
    UNHANDLED_VECTOR 7

    UNHANDLED_VECTOR 8
    UNHANDLED_VECTOR 9
    UNHANDLED_VECTOR 10
    UNHANDLED_VECTOR 11

    UNHANDLED_VECTOR 12
    UNHANDLED_VECTOR 13
    UNHANDLED_VECTOR 14
    UNHANDLED_VECTOR 15
"#
);

unsafe extern "C" {
    static __exception_vectors: u8;
}

/// Vector slot names, in table order.
const VECTOR_SLOTS: [&str; 16] = [
    "EL1t synchronous",
    "EL1t IRQ",
    "EL1t FIQ",
    "EL1t SError",
    "EL1h synchronous",
    "EL1h IRQ",
    "EL1h FIQ",
    "EL1h SError",
    "EL0 (AArch64) synchronous",
    "EL0 (AArch64) IRQ",
    "EL0 (AArch64) FIQ",
    "EL0 (AArch64) SError",
    "EL0 (AArch32) synchronous",
    "EL0 (AArch32) IRQ",
    "EL0 (AArch32) FIQ",
    "EL0 (AArch32) SError",
];

/// Point `VBAR_EL1` at the vector table.
pub fn install_vectors() {
    unsafe {
        let base = core::ptr::addr_of!(__exception_vectors) as u64;
        core::arch::asm!(
            "msr vbar_el1, {0}",
            "isb",
            in(reg) base,
            options(nostack, preserves_flags)
        );
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn irq_entry_rust() {
    crate::irq::dispatch::dispatch_irq();
}

#[unsafe(no_mangle)]
pub extern "C" fn fiq_entry_rust() {
    crate::irq::dispatch::dispatch_fiq();
}

#[unsafe(no_mangle)]
pub extern "C" fn unhandled_exception_rust(kind: u64, esr: u64, elr: u64) -> ! {
    let slot = VECTOR_SLOTS
        .get(kind as usize)
        .copied()
        .unwrap_or("unknown");
    // ESR_EL1.EC
    let class = (esr >> 26) & 0x3F;
    panic!("unhandled {slot} exception: EC {class:#x}, ESR {esr:#x}, ELR {elr:#x}");
}
