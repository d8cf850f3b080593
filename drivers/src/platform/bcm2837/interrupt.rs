//! BCM2837 Interrupt Controller Driver
//!
//! Drives the legacy ARM interrupt controller (three banks: GPU bank 1,
//! GPU bank 2 and the ARM "basic" bank) plus the one ARM-local line the
//! kernel uses, the physical non-secure generic timer of core 0.
//!
//! # Line numbering
//!
//! | lines  | source                                   |
//! |--------|------------------------------------------|
//! | 0..32  | `IRQ_PENDING_1` / `ENABLE_1` / `DISABLE_1` |
//! | 32..64 | `IRQ_PENDING_2` / `ENABLE_2` / `DISABLE_2` |
//! | 64..72 | `IRQ_BASIC_PENDING` bits 0..7             |
//! | 72..84 | ARM-local `IRQ_PENDING0` bits 0..11       |

use log::trace;

use crate::hal::interrupt::{InterruptController, InterruptError, IrqNumber, PendingIrqs};
use crate::hal::mmio::MemoryAccess;

/// Interrupt controller offset from the peripheral base.
const IC_OFFSET: usize = 0xB000;

// Register offsets from the controller base
const IRQ_BASIC_PENDING: usize = 0x200;
const IRQ_PENDING_1: usize = 0x204;
const IRQ_PENDING_2: usize = 0x208;
const FIQ_CONTROL: usize = 0x20C;
const ENABLE_IRQS_1: usize = 0x210;
const ENABLE_IRQS_2: usize = 0x214;
const ENABLE_BASIC_IRQS: usize = 0x218;
const DISABLE_IRQS_1: usize = 0x21C;
const DISABLE_IRQS_2: usize = 0x220;
const DISABLE_BASIC_IRQS: usize = 0x224;

// ARM-local register offsets
const LOCAL_TIMER_INT_CONTROL0: usize = 0x40;
const LOCAL_IRQ_PENDING0: usize = 0x60;

/// Core 0 physical non-secure timer bit, in both control and pending.
const CNTPNSIRQ_BIT: u32 = 1;

const BASIC_PENDING_MASK: u32 = 0xFF;
const FIQ_ENABLE: u32 = 1 << 7;

/// Number of IRQ lines.
pub const IRQ_LINES: IrqNumber = 84;

/// Highest FIQ source id (every bank and basic line).
pub const MAX_FIQ_SOURCE: u32 = 71;

/// Well-known line numbers.
pub mod irq {
    use crate::hal::interrupt::IrqNumber;

    pub const SYSTEM_TIMER_0: IrqNumber = 0;
    pub const SYSTEM_TIMER_1: IrqNumber = 1;
    pub const SYSTEM_TIMER_2: IrqNumber = 2;
    pub const SYSTEM_TIMER_3: IrqNumber = 3;
    pub const USB: IrqNumber = 9;
    pub const AUX: IrqNumber = 29;
    pub const GPIO_0: IrqNumber = 49;
    pub const GPIO_1: IrqNumber = 50;
    pub const GPIO_2: IrqNumber = 51;
    pub const GPIO_3: IrqNumber = 52;
    pub const I2C: IrqNumber = 53;
    pub const SPI: IrqNumber = 54;
    pub const UART: IrqNumber = 57;
    pub const ARM_TIMER: IrqNumber = 64;
    pub const ARM_MAILBOX: IrqNumber = 65;
    pub const LOCAL_CNTPS: IrqNumber = 72;
    pub const LOCAL_CNTPNS: IrqNumber = 73;
}

const BANK_1_BASE: IrqNumber = 0;
const BANK_2_BASE: IrqNumber = 32;
const BASIC_BASE: IrqNumber = 64;
const LOCAL_BASE: IrqNumber = 72;

/// Interrupt line representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum IrqLine {
    Bank1(u32),
    Bank2(u32),
    Basic(u32),
    Local(u32),
}

impl IrqLine {
    fn split(irq: IrqNumber) -> Result<Self, InterruptError> {
        match irq {
            0..=31 => Ok(IrqLine::Bank1(irq)),
            32..=63 => Ok(IrqLine::Bank2(irq - BANK_2_BASE)),
            64..=71 => Ok(IrqLine::Basic(irq - BASIC_BASE)),
            72..=83 => Ok(IrqLine::Local(irq - LOCAL_BASE)),
            _ => Err(InterruptError::InvalidLine(irq)),
        }
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

/// BCM2837 interrupt controller.
#[derive(Debug)]
pub struct Bcm2837InterruptController<M: MemoryAccess> {
    mem: M,
    base: usize,
    local_base: usize,
}

impl<M: MemoryAccess> Bcm2837InterruptController<M> {
    /// Controller for the peripherals at `peripheral_base` and the ARM-local
    /// block at `arm_local_base`.
    pub const fn new(mem: M, peripheral_base: usize, arm_local_base: usize) -> Self {
        Self {
            mem,
            base: peripheral_base + IC_OFFSET,
            local_base: arm_local_base,
        }
    }

    fn write_mask(&mut self, irq: IrqNumber, enable: bool) -> Result<(), InterruptError> {
        let (register, bit) = match IrqLine::split(irq)? {
            IrqLine::Bank1(bit) if enable => (self.base + ENABLE_IRQS_1, bit),
            IrqLine::Bank1(bit) => (self.base + DISABLE_IRQS_1, bit),
            IrqLine::Bank2(bit) if enable => (self.base + ENABLE_IRQS_2, bit),
            IrqLine::Bank2(bit) => (self.base + DISABLE_IRQS_2, bit),
            IrqLine::Basic(bit) if enable => (self.base + ENABLE_BASIC_IRQS, bit),
            IrqLine::Basic(bit) => (self.base + DISABLE_BASIC_IRQS, bit),
            IrqLine::Local(CNTPNSIRQ_BIT) => {
                self.mem.read_modify_write32(
                    self.local_base + LOCAL_TIMER_INT_CONTROL0,
                    1 << CNTPNSIRQ_BIT,
                    u32::from(enable),
                    CNTPNSIRQ_BIT as u8,
                );
                return Ok(());
            }
            IrqLine::Local(_) => return Err(InterruptError::UnsupportedLine(irq)),
        };

        self.mem.write32(register, 1 << bit);
        Ok(())
    }
}

impl<M: MemoryAccess> InterruptController for Bcm2837InterruptController<M> {
    const LINES: IrqNumber = IRQ_LINES;
    const MAX_FIQ: u32 = MAX_FIQ_SOURCE;

    fn enable(&mut self, irq: IrqNumber) -> Result<(), InterruptError> {
        self.write_mask(irq, true)?;
        trace!("IRQ {irq} unmasked");
        Ok(())
    }

    fn disable(&mut self, irq: IrqNumber) -> Result<(), InterruptError> {
        self.write_mask(irq, false)?;
        trace!("IRQ {irq} masked");
        Ok(())
    }

    fn disable_all(&mut self) {
        self.mem.write32(self.base + FIQ_CONTROL, 0);
        self.mem.write32(self.base + DISABLE_IRQS_1, u32::MAX);
        self.mem.write32(self.base + DISABLE_IRQS_2, u32::MAX);
        self.mem.write32(self.base + DISABLE_BASIC_IRQS, u32::MAX);
        self.mem.write32(self.local_base + LOCAL_TIMER_INT_CONTROL0, 0);
    }

    fn pending(&self) -> PendingIrqs {
        let mut pending = PendingIrqs::new();

        let local = self.mem.read32(self.local_base + LOCAL_IRQ_PENDING0);
        pending.push(LOCAL_BASE, local & (1 << CNTPNSIRQ_BIT));
        pending.push(BANK_1_BASE, self.mem.read32(self.base + IRQ_PENDING_1));
        pending.push(BANK_2_BASE, self.mem.read32(self.base + IRQ_PENDING_2));
        pending.push(
            BASIC_BASE,
            self.mem.read32(self.base + IRQ_BASIC_PENDING) & BASIC_PENDING_MASK,
        );

        pending
    }

    fn enable_fiq(&mut self, source: u32) -> Result<(), InterruptError> {
        if source > MAX_FIQ_SOURCE {
            return Err(InterruptError::InvalidFiqSource(source));
        }
        self.mem.write32(self.base + FIQ_CONTROL, source | FIQ_ENABLE);
        Ok(())
    }

    fn disable_fiq(&mut self) {
        self.mem.write32(self.base + FIQ_CONTROL, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySpy;

    const PERIPHERALS: usize = 0x3F00_0000;
    const LOCAL: usize = 0x4000_0000;
    const IC: usize = PERIPHERALS + IC_OFFSET;

    fn controller(spy: &MemorySpy) -> Bcm2837InterruptController<&MemorySpy> {
        Bcm2837InterruptController::new(spy, PERIPHERALS, LOCAL)
    }

    #[test]
    fn bank_lines_use_write_one_registers() {
        let spy = MemorySpy::new();
        let mut intc = controller(&spy);

        intc.enable(irq::SYSTEM_TIMER_1).unwrap();
        intc.enable(irq::UART).unwrap();
        intc.enable(irq::ARM_MAILBOX).unwrap();
        intc.disable(irq::SYSTEM_TIMER_1).unwrap();
        intc.disable(irq::UART).unwrap();
        intc.disable(irq::ARM_MAILBOX).unwrap();

        assert_eq!(
            spy.writes(),
            vec![
                (IC + 0x210, 1 << 1),
                (IC + 0x214, 1 << 25),
                (IC + 0x218, 1 << 1),
                (IC + 0x21C, 1 << 1),
                (IC + 0x220, 1 << 25),
                (IC + 0x224, 1 << 1),
            ]
        );
    }

    #[test]
    fn local_timer_line_toggles_control_bit() {
        let spy = MemorySpy::new();
        spy.set(LOCAL + 0x40, 0b1000_0001);
        let mut intc = controller(&spy);

        intc.enable(irq::LOCAL_CNTPNS).unwrap();
        assert_eq!(spy.value(LOCAL + 0x40), 0b1000_0011);

        intc.disable(irq::LOCAL_CNTPNS).unwrap();
        assert_eq!(spy.value(LOCAL + 0x40), 0b1000_0001);
    }

    #[test]
    fn other_local_lines_are_unsupported() {
        let spy = MemorySpy::new();
        let mut intc = controller(&spy);

        assert_eq!(
            intc.enable(irq::LOCAL_CNTPS),
            Err(InterruptError::UnsupportedLine(72))
        );
        assert_eq!(intc.disable(83), Err(InterruptError::UnsupportedLine(83)));
        assert_eq!(intc.enable(84), Err(InterruptError::InvalidLine(84)));
        assert!(spy.accesses().is_empty());
    }

    #[test]
    fn disable_all_writes_every_mask() {
        let spy = MemorySpy::new();
        let mut intc = controller(&spy);

        intc.disable_all();

        assert_eq!(
            spy.writes(),
            vec![
                (IC + 0x20C, 0),
                (IC + 0x21C, 0xFFFF_FFFF),
                (IC + 0x220, 0xFFFF_FFFF),
                (IC + 0x224, 0xFFFF_FFFF),
                (LOCAL + 0x40, 0),
            ]
        );
    }

    #[test]
    fn pending_reports_local_then_banks_then_basic() {
        let spy = MemorySpy::new();
        spy.set(LOCAL + 0x60, 0b1011);
        spy.set(IC + 0x204, 1 << 3);
        spy.set(IC + 0x208, 1 << 25);
        spy.set(IC + 0x200, (1 << 9) | (1 << 8) | 1);
        let intc = controller(&spy);

        let lines: Vec<_> = intc.pending().lines().collect();

        assert_eq!(lines, vec![73, 3, 57, 64]);
    }

    #[test]
    fn fiq_source_is_armed_with_enable_bit() {
        let spy = MemorySpy::new();
        let mut intc = controller(&spy);

        assert_eq!(
            intc.enable_fiq(72),
            Err(InterruptError::InvalidFiqSource(72))
        );
        intc.enable_fiq(irq::UART).unwrap();
        assert_eq!(spy.value(IC + 0x20C), 57 | 0x80);

        intc.disable_fiq();
        assert_eq!(spy.value(IC + 0x20C), 0);
    }
}
