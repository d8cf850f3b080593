//! BCM2837 (Raspberry Pi 3) platform drivers.
//!
//! The same register layout serves the BCM2711 in legacy interrupt mode;
//! only the base addresses in [`crate::platform`] differ.

pub mod gpio;
pub mod interrupt;
pub mod mailbox;
pub mod memory;
pub mod timer;

use core::fmt;

use log::{debug, info};

pub use gpio::Bcm2837Gpio;
pub use interrupt::Bcm2837InterruptController;
pub use mailbox::{Bcm2837Mailbox, Channel, WaitPolicy};
pub use memory::{CoherentPage, CoherentPageSlot, coherent_page};
pub use timer::SystemTimer;

use crate::hal::gpio::{GpioController, GpioError, PullMode};
use crate::hal::mailbox::Mailbox;
use crate::hal::mmio::MemoryAccess;
use crate::hal::serial::{SerialConfig, SerialError, SerialPort};
use crate::peripheral::pl011::{Pl011, UART0_OFFSET};
use crate::property::{ClockId, PropertyError, RpiProperties};

/// Reference clock requested for UART0 before it is configured.
pub const UART0_CLOCK_HZ: u32 = 4_000_000;

const UART0_TXD_PIN: u8 = 14;
const UART0_RXD_PIN: u8 = 15;

/// Reasons UART0 could not be brought up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BringUpError {
    /// The firmware refused the UART clock.
    Clock(PropertyError),
    Gpio(GpioError),
    Serial(SerialError),
}

impl From<PropertyError> for BringUpError {
    fn from(err: PropertyError) -> Self {
        BringUpError::Clock(err)
    }
}

impl From<GpioError> for BringUpError {
    fn from(err: GpioError) -> Self {
        BringUpError::Gpio(err)
    }
}

impl From<SerialError> for BringUpError {
    fn from(err: SerialError) -> Self {
        BringUpError::Serial(err)
    }
}

impl fmt::Display for BringUpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock(err) => write!(f, "UART clock: {err}"),
            Self::Gpio(err) => write!(f, "UART pins: {err}"),
            Self::Serial(err) => write!(f, "UART: {err}"),
        }
    }
}

/// Bring UART0 up through the property channel.
///
/// Requests [`UART0_CLOCK_HZ`] for the UART clock, routes GPIO 14/15 to
/// ALT0 and configures the PL011. If the clock request fails nothing else
/// is touched and the error is returned.
pub fn bring_up_uart0<B, G, M>(
    properties: &mut RpiProperties<'_, B>,
    gpio: &mut Bcm2837Gpio<G>,
    mem: M,
    peripheral_base: usize,
    config: SerialConfig,
) -> Result<Pl011<M>, BringUpError>
where
    B: Mailbox,
    G: MemoryAccess,
    M: MemoryAccess,
{
    properties.set_clock_rate(ClockId::Uart, UART0_CLOCK_HZ, false)?;
    debug!("UART0 clock at {UART0_CLOCK_HZ} Hz");

    for pin in [UART0_TXD_PIN, UART0_RXD_PIN] {
        gpio.set_pull(pin, PullMode::None)?;
        gpio.set_alt_function(pin, 0)?;
    }

    let mut uart = Pl011::new(mem, peripheral_base + UART0_OFFSET, UART0_CLOCK_HZ);
    uart.configure(config)?;

    info!("UART0 up at {} baud", config.baud_rate);
    Ok(uart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertiesInterface;
    use crate::property::tag::TAG_RESPONSE_BIT;
    use crate::testing::{FakeFirmware, MemorySpy};

    const PERIPHERALS: usize = 0x3F00_0000;

    #[test]
    fn uart_comes_up_after_clock_request() {
        let page = CoherentPage::new();
        let mut firmware =
            FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 8, &[2, 4_000_000]);
        let mut properties =
            RpiProperties::new(PropertiesInterface::new(&mut firmware, &page));
        let spy = MemorySpy::new();
        let mut gpio = Bcm2837Gpio::new(&spy, PERIPHERALS);

        let uart = bring_up_uart0(
            &mut properties,
            &mut gpio,
            &spy,
            PERIPHERALS,
            SerialConfig::new_8n1(115_200),
        );

        assert!(uart.is_ok());
        // GPFSEL1: pins 14 and 15 at ALT0.
        assert_eq!(
            spy.value(PERIPHERALS + 0x20_0004),
            (0b100 << 12) | (0b100 << 15)
        );
        assert_eq!(spy.value(PERIPHERALS + 0x20_1030), 0x301);
        assert_eq!(firmware.calls(), 1);
    }

    #[test]
    fn clock_failure_leaves_hardware_alone() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 8, &[2, 0]);
        firmware.respond_with_code(0x8000_0001);
        let mut properties =
            RpiProperties::new(PropertiesInterface::new(&mut firmware, &page));
        let spy = MemorySpy::new();
        let mut gpio = Bcm2837Gpio::new(&spy, PERIPHERALS);

        let uart = bring_up_uart0(
            &mut properties,
            &mut gpio,
            &spy,
            PERIPHERALS,
            SerialConfig::default(),
        );

        assert!(matches!(
            uart,
            Err(BringUpError::Clock(PropertyError::RequestFailed(0x8000_0001)))
        ));
        assert!(spy.accesses().is_empty());
    }
}
