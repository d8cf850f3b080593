//! Kernel interrupt handlers.

use core::sync::atomic::{AtomicU64, Ordering};

use drivers::platform::{self, bcm2837::SystemTimer, bcm2837::timer::Channel};
use drivers::{IrqHandler, IrqNumber, Mmio, Timer};
use log::{debug, info};
use spin::Mutex;

/// Compare channel driving the tick. Channels 0 and 2 belong to the GPU.
pub const TICK_CHANNEL: Channel = Channel::Channel1;

/// Tick period.
pub const TICK_INTERVAL_US: u32 = 1_000_000;

/// Periodic tick on a system timer compare channel.
pub struct TickHandler {
    timer: Mutex<SystemTimer<Mmio>>,
    channel: Channel,
    interval_us: u32,
    ticks: AtomicU64,
}

impl TickHandler {
    pub const fn new(timer: SystemTimer<Mmio>, channel: Channel, interval_us: u32) -> Self {
        Self {
            timer: Mutex::new(timer),
            channel,
            interval_us,
            ticks: AtomicU64::new(0),
        }
    }

    /// Line to register this handler on.
    pub fn irq(&self) -> IrqNumber {
        self.channel.irq_number()
    }

    /// Program the first match.
    pub fn start(&self) {
        let Ok(()) = self.timer.lock().start(self.channel, self.interval_us);
        debug!("tick every {} us on IRQ {}", self.interval_us, self.irq());
    }
}

impl IrqHandler for TickHandler {
    fn handle(&self, _irq: IrqNumber) {
        let mut timer = self.timer.lock();
        let Ok(()) = timer.clear_interrupt(self.channel);
        let Ok(()) = timer.start(self.channel, self.interval_us);
        drop(timer);

        let ticks = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        info!("tick {ticks}");
    }
}

/// The kernel tick.
pub static TICK: TickHandler = TickHandler::new(
    SystemTimer::new(
        unsafe { Mmio::new() },
        platform::memory_map().peripheral_base,
    ),
    TICK_CHANNEL,
    TICK_INTERVAL_US,
);
