//! BCM2837 Mailbox Interface
//!
//! The mailbox is the doorbell between the ARM CPU and the VideoCore GPU.
//! Mailbox 0 carries replies to the ARM, mailbox 1 carries requests to the
//! GPU. Each 32-bit word packs a 16-byte aligned bus address with a 4-bit
//! channel number in the low bits.
//!
//! # Usage
//!
//! ```ignore
//! let mut mailbox = Bcm2837Mailbox::new(mmio, &timer, PERIPHERAL_BASE, Channel::PropertyArmToVc);
//! let reply = mailbox.write_read(bus_address)?;
//! ```

use bitflags::bitflags;
use log::{trace, warn};

use crate::hal::mailbox::{Mailbox, MailboxError};
use crate::hal::mmio::MemoryAccess;
use crate::hal::timer::Delay;

/// Mailbox offset from the peripheral base.
const MAILBOX_OFFSET: usize = 0xB880;

// Register offsets from the mailbox base
const MAILBOX0_READ: usize = 0x00;
const MAILBOX0_STATUS: usize = 0x18;
const MAILBOX1_WRITE: usize = 0x20;
const MAILBOX1_STATUS: usize = 0x38;

const CHANNEL_MASK: u32 = 0xF;

/// Pause between reads while draining stale replies.
const FLUSH_DELAY_MS: u32 = 20;

bitflags! {
    /// Mailbox status register.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct MailboxStatus: u32 {
        /// Nothing to read.
        const EMPTY = 1 << 30;
        /// No room to write.
        const FULL = 1 << 31;
    }
}

/// Mailbox channels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Channel {
    /// Power management.
    Power = 0,
    /// Framebuffer.
    Framebuffer = 1,
    /// Virtual UART.
    VirtualUart = 2,
    /// VCHIQ.
    Vchiq = 3,
    /// LEDs.
    Leds = 4,
    /// Buttons.
    Buttons = 5,
    /// Touch screen.
    Touchscreen = 6,
    /// Counter.
    Count = 7,
    /// Property tags, ARM to VideoCore.
    PropertyArmToVc = 8,
    /// Property tags, VideoCore to ARM.
    PropertyVcToArm = 9,
}

impl From<Channel> for u32 {
    fn from(channel: Channel) -> u32 {
        channel as u32
    }
}

/// How long the mailbox waits on its status flags.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Poll until the GPU answers. A wedged GPU hangs the caller.
    #[default]
    Forever,
    /// Give up with [`MailboxError::Timeout`] after `polls` unsuccessful
    /// status reads in one phase (flush, write or read).
    Bounded { polls: u32 },
}

struct Poller {
    policy: WaitPolicy,
    polls: u32,
}

impl Poller {
    fn new(policy: WaitPolicy) -> Self {
        Self { policy, polls: 0 }
    }

    fn tick(&mut self) -> Result<(), MailboxError> {
        if let WaitPolicy::Bounded { polls } = self.policy {
            self.polls += 1;
            if self.polls >= polls {
                return Err(MailboxError::Timeout);
            }
        }
        core::hint::spin_loop();
        Ok(())
    }
}

/// Mailbox bound to one channel.
#[derive(Debug)]
pub struct Bcm2837Mailbox<M: MemoryAccess, D: Delay> {
    mem: M,
    delay: D,
    base: usize,
    channel: Channel,
    wait: WaitPolicy,
}

impl<M: MemoryAccess, D: Delay> Bcm2837Mailbox<M, D> {
    pub const fn new(mem: M, delay: D, peripheral_base: usize, channel: Channel) -> Self {
        Self {
            mem,
            delay,
            base: peripheral_base + MAILBOX_OFFSET,
            channel,
            wait: WaitPolicy::Forever,
        }
    }

    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    #[inline]
    fn status(&self, register: usize) -> MailboxStatus {
        MailboxStatus::from_bits_truncate(self.mem.read32(self.base + register))
    }

    /// Drain replies left over from earlier transactions.
    pub fn flush(&mut self) -> Result<(), MailboxError> {
        let mut poller = Poller::new(self.wait);

        while !self.status(MAILBOX0_STATUS).contains(MailboxStatus::EMPTY) {
            let stale = self.mem.read32(self.base + MAILBOX0_READ);
            trace!("mailbox flush discarded {stale:#010x}");
            self.delay.delay_ms(FLUSH_DELAY_MS);
            poller.tick()?;
        }
        Ok(())
    }

    /// Post `data` on this channel.
    ///
    /// Words with any of the low four bits set are dropped without touching
    /// the hardware.
    pub fn write(&mut self, data: u32) -> Result<(), MailboxError> {
        if data & CHANNEL_MASK != 0 {
            warn!("mailbox write of unaligned word {data:#010x} ignored");
            return Ok(());
        }

        let mut poller = Poller::new(self.wait);
        while self.status(MAILBOX1_STATUS).contains(MailboxStatus::FULL) {
            poller.tick()?;
        }

        self.mem
            .write32(self.base + MAILBOX1_WRITE, u32::from(self.channel) | data);
        Ok(())
    }

    /// Wait for the next reply on this channel and strip the channel bits.
    ///
    /// Replies for other channels are discarded.
    pub fn read(&mut self) -> Result<u32, MailboxError> {
        let mut poller = Poller::new(self.wait);

        loop {
            while self.status(MAILBOX0_STATUS).contains(MailboxStatus::EMPTY) {
                poller.tick()?;
            }

            let word = self.mem.read32(self.base + MAILBOX0_READ);
            if word & CHANNEL_MASK == u32::from(self.channel) {
                return Ok(word & !CHANNEL_MASK);
            }

            trace!("mailbox dropped {word:#010x} for another channel");
            poller.tick()?;
        }
    }
}

impl<M: MemoryAccess, D: Delay> Mailbox for Bcm2837Mailbox<M, D> {
    fn write_read(&mut self, address: u32) -> Result<u32, MailboxError> {
        if address & CHANNEL_MASK != 0 {
            return Err(MailboxError::Misaligned(address));
        }

        self.flush()?;
        self.write(address)?;
        self.read()
    }
}
