use crate::sync::irq::IrqControl;

/// DAIF.I: IRQs masked when set.
const DAIF_I_BIT: u64 = 1 << 7;

/// IRQ masking through the AArch64 `DAIF` register.
///
/// `State` is `true` when IRQs were unmasked before [`IrqControl::disable`]
/// ran, so nested critical sections only unmask on the outermost restore.
///
/// - `mrs {0}, daif`: read the current exception mask bits
/// - `msr daifset, #2`: mask IRQ
/// - `msr daifclr, #2`: unmask IRQ
///
/// Both mask changes clobber memory so the compiler keeps critical-section
/// accesses between them.
pub struct Aarch64Irq;

impl IrqControl for Aarch64Irq {
    type State = bool;

    #[inline(always)]
    fn disable() -> bool {
        let daif: u64;
        unsafe {
            core::arch::asm!(
                "mrs {0}, daif",
                "msr daifset, #2",
                out(reg) daif,
                options(nostack)
            );
        }
        daif & DAIF_I_BIT == 0
    }

    #[inline(always)]
    fn restore(prev_enabled: bool) {
        if prev_enabled {
            Self::enable();
        }
    }

    #[inline(always)]
    fn enable() {
        unsafe {
            core::arch::asm!("msr daifclr, #2", options(nostack));
        }
    }
}
