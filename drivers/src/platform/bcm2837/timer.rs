//! BCM2837 System Timer Driver
//!
//! The system timer has a 64-bit free-running counter at 1MHz and
//! four compare channels that can generate interrupts.

use crate::hal::mmio::MemoryAccess;
use crate::hal::timer::{CountingTimer, Delay, Timer};

/// System timer offset from the peripheral base.
const TIMER_OFFSET: usize = 0x3000;

// Register offsets
const CS: usize = 0x00;
const CLO: usize = 0x04;
const CHI: usize = 0x08;
const C0: usize = 0x0C;

/// System timer compare channels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum Channel {
    Channel0 = 0,
    Channel1 = 1,
    Channel2 = 2,
    Channel3 = 3,
}

impl Channel {
    /// Get the IRQ number for this channel.
    pub fn irq_number(self) -> u32 {
        self as u32
    }

    fn bitmask(self) -> u32 {
        1 << (self as u32)
    }

    fn compare_offset(self) -> usize {
        C0 + 4 * self as usize
    }
}

/// Timer errors (system timer operations are infallible).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerError {}

/// BCM2837 system timer.
#[derive(Debug)]
pub struct SystemTimer<M: MemoryAccess> {
    mem: M,
    base: usize,
}

impl<M: MemoryAccess> SystemTimer<M> {
    pub const fn new(mem: M, peripheral_base: usize) -> Self {
        Self {
            mem,
            base: peripheral_base + TIMER_OFFSET,
        }
    }

    /// Read the 64-bit free-running counter.
    pub fn read_counter(&self) -> u64 {
        // High word first; re-read low if it rolled over in between.
        let hi1 = self.mem.read32(self.base + CHI);
        let lo = self.mem.read32(self.base + CLO);
        let hi2 = self.mem.read32(self.base + CHI);

        let (hi, lo) = if hi1 != hi2 {
            (hi2, self.mem.read32(self.base + CLO))
        } else {
            (hi1, lo)
        };

        (u64::from(hi) << 32) | u64::from(lo)
    }
}

impl<M: MemoryAccess> Timer for SystemTimer<M> {
    type Handle = Channel;
    type Error = TimerError;

    fn start(&mut self, handle: Channel, interval_us: u32) -> Result<(), TimerError> {
        let clo = self.mem.read32(self.base + CLO);

        // Clear pending match, then program the compare register
        self.mem.write32(self.base + CS, handle.bitmask());
        self.mem
            .write32(self.base + handle.compare_offset(), clo.wrapping_add(interval_us));
        Ok(())
    }

    fn clear_interrupt(&mut self, handle: Channel) -> Result<(), TimerError> {
        self.mem.write32(self.base + CS, handle.bitmask());
        Ok(())
    }

    fn is_pending(&self, handle: Channel) -> Result<bool, TimerError> {
        Ok(self.mem.read32(self.base + CS) & handle.bitmask() != 0)
    }
}

impl<M: MemoryAccess> CountingTimer for SystemTimer<M> {
    fn now_us(&self) -> u64 {
        self.read_counter()
    }
}

impl<M: MemoryAccess> Delay for SystemTimer<M> {
    fn delay_us(&self, us: u32) {
        let start = self.now_us();
        let duration = u64::from(us);

        while self.now_us().wrapping_sub(start) < duration {
            core::hint::spin_loop();
        }
    }
}
