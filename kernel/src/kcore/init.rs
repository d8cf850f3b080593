use common::arch::CpuIrq;
use common::sync::irq::IrqControl;
use drivers::hal::mailbox::Mailbox;
use drivers::platform::bcm2837::{
    Bcm2837Gpio, Bcm2837InterruptController, Bcm2837Mailbox, BringUpError, Channel,
    CoherentPageSlot, SystemTimer, WaitPolicy, bring_up_uart0, coherent_page,
};
use drivers::platform::{self, MemoryMap};
use drivers::property::ClockId;
use drivers::{InterruptSystem, Mmio, PropertiesInterface, RpiProperties, SerialConfig};
use log::{info, warn};

use crate::irq::INTERRUPTS;
use crate::irq::handlers::TICK;
use crate::logger;

// ============================================================================
// Boot Configuration
// ============================================================================

const CONSOLE_BAUD: u32 = 115_200;

/// Status polls per mailbox phase before the firmware is declared wedged.
const MAILBOX_POLLS: u32 = 1 << 20;

// ============================================================================
// Kernel Initialization
// ============================================================================

/// Bring up the console, report the board and start the tick.
///
/// An error means there is no console to report on.
pub fn kernel_init() -> Result<(), BringUpError> {
    let map = platform::memory_map();
    let mmio = unsafe { Mmio::new() };

    let timer = SystemTimer::new(mmio, map.peripheral_base);
    let mailbox = Bcm2837Mailbox::new(mmio, timer, map.peripheral_base, Channel::PropertyArmToVc)
        .with_wait_policy(WaitPolicy::Bounded {
            polls: MAILBOX_POLLS,
        });
    let page = coherent_page(CoherentPageSlot::PropertyMailbox);
    let mut properties = RpiProperties::new(PropertiesInterface::new(mailbox, page));
    let mut gpio = Bcm2837Gpio::new(mmio, map.peripheral_base);

    let uart = bring_up_uart0(
        &mut properties,
        &mut gpio,
        mmio,
        map.peripheral_base,
        SerialConfig::new_8n1(CONSOLE_BAUD),
    )?;
    // Fails only if a logger is already installed.
    let _ = logger::init(uart);

    info!("booting on {}", platform::PLATFORM_NAME);
    report_board(&mut properties);
    init_interrupts(mmio, &map);

    info!("early init done");
    Ok(())
}

fn report_board<B: Mailbox>(properties: &mut RpiProperties<'_, B>) {
    match properties.firmware_revision() {
        Ok(revision) => info!("firmware revision {revision:#x}"),
        Err(err) => warn!("firmware revision: {err}"),
    }
    match properties.board_revision() {
        Ok(revision) => info!("board revision {revision:#x}"),
        Err(err) => warn!("board revision: {err}"),
    }
    match properties.board_serial() {
        Ok(serial) => info!("board serial {serial:#018x}"),
        Err(err) => warn!("board serial: {err}"),
    }
    match properties.board_mac_address() {
        Ok([a, b, c, d, e, f]) => {
            info!("MAC {a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{f:02x}")
        }
        Err(err) => warn!("MAC address: {err}"),
    }
    match properties.arm_memory() {
        Ok(region) => info!("ARM memory {:#x} + {:#x}", region.base, region.size),
        Err(err) => warn!("ARM memory: {err}"),
    }
    match properties.vc_memory() {
        Ok(region) => info!("VC memory {:#x} + {:#x}", region.base, region.size),
        Err(err) => warn!("VC memory: {err}"),
    }
    match properties.clock_rate(ClockId::Arm) {
        Ok(hz) => info!("ARM clock {} MHz", hz / 1_000_000),
        Err(err) => warn!("ARM clock: {err}"),
    }
    match properties.temperature() {
        Ok(millidegrees) => info!("SoC at {}.{:03} C", millidegrees / 1000, millidegrees % 1000),
        Err(err) => warn!("temperature: {err}"),
    }
}

fn init_interrupts(mmio: Mmio, map: &MemoryMap) {
    let controller =
        Bcm2837InterruptController::new(mmio, map.peripheral_base, map.arm_local_base);

    {
        let mut interrupts = INTERRUPTS.lock();
        let system = interrupts.insert(InterruptSystem::new(controller));
        system.initialize_masked();
        TICK.start();
        system.attach_irq_handler(TICK.irq(), &TICK);
    }

    // The vector takes INTERRUPTS, so unmask only once it is free.
    CpuIrq::enable();
}
