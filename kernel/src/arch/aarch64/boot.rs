//! Reset entry.
//!
//! The firmware starts every core at `_start` (EL2 on a stock Raspberry Pi
//! boot). Core 0 drops to EL1h with all exceptions masked, takes the stack
//! below the load address, clears `.bss` and calls `kernel_main`. The other
//! cores sleep.

use core::arch::global_asm;

global_asm!(
    r#"
.section .text.boot
.global _start

_start:
    mrs     x0, mpidr_el1
    and     x0, x0, #0xFF
    cbnz    x0, .Lpark

    mrs     x0, CurrentEL
    lsr     x0, x0, #2
    cmp     x0, #2
    b.ne    .Lel1

    // EL1 runs AArch64 and may use the physical counter and timer.
    mov     x0, #(1 << 31)
    msr     hcr_el2, x0
    mov     x0, #3
    msr     cnthctl_el2, x0
    msr     cntvoff_el2, xzr
    msr     cptr_el2, xzr

    // EL1h, DAIF masked.
    mov     x0, #0x3C5
    msr     spsr_el2, x0
    adr     x0, .Lel1
    msr     elr_el2, x0
    eret

.Lel1:
    // No FP/SIMD traps at EL1.
    mov     x0, #(3 << 20)
    msr     cpacr_el1, x0
    isb

    ldr     x0, =__stack_top
    mov     sp, x0

    ldr     x0, =__bss_start
    ldr     x1, =__bss_end
.Lclear_bss:
    cmp     x0, x1
    b.hs    .Lbss_done
    str     xzr, [x0], #8
    b       .Lclear_bss
.Lbss_done:

    bl      kernel_main

.Lpark:
    wfe
    b       .Lpark
"#
);
