//! Timers and delays.
//!
//! [`Timer`] covers compare channels that raise an interrupt, [`Delay`] the
//! busy waits some register sequences need.

/// Interrupting timer with one or more compare channels.
pub trait Timer {
    /// Names one compare channel.
    type Handle: Copy + Clone;

    type Error: core::fmt::Debug;

    /// Arm `handle` to fire `interval_us` microseconds from now.
    fn start(&mut self, handle: Self::Handle, interval_us: u32) -> Result<(), Self::Error>;

    /// Acknowledge a match so the line drops.
    fn clear_interrupt(&mut self, handle: Self::Handle) -> Result<(), Self::Error>;

    fn is_pending(&self, handle: Self::Handle) -> Result<bool, Self::Error>;
}

/// A [`Timer`] whose free-running counter can be read.
pub trait CountingTimer: Timer {
    /// Microseconds since the counter started.
    fn now_us(&self) -> u64;
}

/// Busy-wait delay source.
///
/// Injected into drivers that must pause between register accesses (the
/// mailbox flush loop, for instance) so tests can substitute a no-op.
pub trait Delay {
    /// Block for at least `us` microseconds.
    fn delay_us(&self, us: u32);

    /// Block for at least `ms` milliseconds.
    fn delay_ms(&self, ms: u32) {
        self.delay_us(ms.saturating_mul(1000));
    }
}

impl<D: Delay + ?Sized> Delay for &D {
    fn delay_us(&self, us: u32) {
        (**self).delay_us(us)
    }
}
