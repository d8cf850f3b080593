//! Host stand-ins for the AArch64 primitives.

use core::sync::atomic::{AtomicBool, Ordering, fence};

use crate::sync::irq::IrqControl;

#[inline(always)]
pub fn dsb() {
    fence(Ordering::SeqCst);
}

#[inline(always)]
pub fn dmb() {
    fence(Ordering::SeqCst);
}

#[inline(always)]
pub fn isb() {
    fence(Ordering::SeqCst);
}

#[inline(always)]
pub fn wfi() {
    core::hint::spin_loop();
}

#[inline(always)]
pub fn nop() {
    core::hint::spin_loop();
}

static HOST_IRQS_ENABLED: AtomicBool = AtomicBool::new(false);

/// Process-wide flag standing in for the CPU IRQ mask.
pub struct HostIrq;

impl HostIrq {
    /// Whether the simulated CPU currently accepts IRQs.
    pub fn is_enabled() -> bool {
        HOST_IRQS_ENABLED.load(Ordering::SeqCst)
    }
}

impl IrqControl for HostIrq {
    type State = bool;

    fn disable() -> bool {
        HOST_IRQS_ENABLED.swap(false, Ordering::SeqCst)
    }

    fn restore(prev_enabled: bool) {
        if prev_enabled {
            Self::enable();
        }
    }

    fn enable() {
        HOST_IRQS_ENABLED.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::IrqSpinLock;

    #[test]
    fn lock_on_host_restores_previous_mask() {
        HostIrq::enable();
        let lock: IrqSpinLock<u8, HostIrq> = IrqSpinLock::new(0);

        {
            let mut guard = lock.lock();
            *guard = 7;
            assert!(!HostIrq::is_enabled());
        }
        assert!(HostIrq::is_enabled());

        let prev = HostIrq::disable();
        drop(lock.lock());
        assert!(!HostIrq::is_enabled());
        HostIrq::restore(prev);
        assert!(HostIrq::is_enabled());
        assert_eq!(*lock.lock(), 7);
    }
}
