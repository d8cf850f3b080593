//! PL011 UART.
//!
//! UART0 on the Raspberry Pi. Its reference clock is whatever the firmware
//! was asked for over the property channel, so the driver takes the rate as
//! a constructor argument instead of assuming one. Only 8N1 framing is
//! supported; transfers poll the flag register.
//!
//! ```ignore
//! let mut uart = Pl011::new(mmio, PERIPHERAL_BASE + UART0_OFFSET, 4_000_000);
//! uart.configure(SerialConfig::new_8n1(115_200))?;
//! ```

use crate::hal::mmio::MemoryAccess;
use crate::hal::serial::{DataBits, Parity, SerialConfig, SerialError, SerialPort, StopBits};

/// UART0 offset from the peripheral base.
pub const UART0_OFFSET: usize = 0x20_1000;

// Registers
const DR_OFFSET: usize = 0x00;
const FR_OFFSET: usize = 0x18;
const IBRD_OFFSET: usize = 0x24;
const FBRD_OFFSET: usize = 0x28;
const LCRH_OFFSET: usize = 0x2C;
const CR_OFFSET: usize = 0x30;
const IMSC_OFFSET: usize = 0x38;
const ICR_OFFSET: usize = 0x44;

// FR
const FR_BUSY: u32 = 1 << 3;
const FR_RXFE: u32 = 1 << 4;
const FR_TXFF: u32 = 1 << 5;

// CR
const CR_UARTEN: u32 = 1 << 0;
const CR_TXE: u32 = 1 << 8;
const CR_RXE: u32 = 1 << 9;

// LCRH
const LCRH_WLEN_8: u32 = 0b11 << 5;
const LCRH_FEN: u32 = 1 << 4;

const ICR_ALL: u32 = 0x07FF;

#[derive(Debug)]
pub struct Pl011<M: MemoryAccess> {
    mem: M,
    base: usize,
    clock_hz: u32,
}

impl<M: MemoryAccess> Pl011<M> {
    /// UART at `base`, clocked at `clock_hz` (the rate requested for
    /// `ClockId::Uart`).
    pub const fn new(mem: M, base: usize, clock_hz: u32) -> Self {
        Self {
            mem,
            base,
            clock_hz,
        }
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u32 {
        self.mem.read32(self.base + offset)
    }

    #[inline]
    fn write_reg(&mut self, offset: usize, value: u32) {
        self.mem.write32(self.base + offset, value)
    }

    /// Spin while a character is still on the wire.
    fn wait_idle(&self) {
        while self.read_reg(FR_OFFSET) & FR_BUSY != 0 {
            core::hint::spin_loop();
        }
    }

    /// Integer and 6-bit fractional baud divisors, rounded to nearest.
    fn calculate_divisors(&self, baud_rate: u32) -> Result<(u32, u32), SerialError> {
        if baud_rate == 0 {
            return Err(SerialError::InvalidBaudRate(baud_rate));
        }

        // BAUDDIV = FUARTCLK / (16 * baud), in 1/64 steps
        let denominator = 16 * u64::from(baud_rate);
        let divisor = ((u64::from(self.clock_hz) << 6) + denominator / 2) / denominator;

        let integer = (divisor >> 6) as u32;
        let fractional = (divisor & 0x3F) as u32;

        if integer == 0 || integer > 0xFFFF {
            return Err(SerialError::InvalidBaudRate(baud_rate));
        }

        Ok((integer, fractional))
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

impl<M: MemoryAccess> SerialPort for Pl011<M> {
    fn configure(&mut self, config: SerialConfig) -> Result<(), SerialError> {
        if config.data_bits != DataBits::Eight
            || config.parity != Parity::None
            || config.stop_bits != StopBits::One
        {
            return Err(SerialError::UnsupportedFormat);
        }
        let (ibrd, fbrd) = self.calculate_divisors(config.baud_rate)?;

        // Off while the divisors change.
        let cr = self.read_reg(CR_OFFSET);
        self.write_reg(CR_OFFSET, cr & !CR_UARTEN);

        self.wait_idle();

        // Clearing FEN empties both FIFOs.
        let lcrh = self.read_reg(LCRH_OFFSET);
        self.write_reg(LCRH_OFFSET, lcrh & !LCRH_FEN);

        self.write_reg(IBRD_OFFSET, ibrd);
        self.write_reg(FBRD_OFFSET, fbrd);

        // LCRH latches the divisors.
        self.write_reg(LCRH_OFFSET, LCRH_WLEN_8 | LCRH_FEN);

        // Polled: every source cleared and masked.
        self.write_reg(ICR_OFFSET, ICR_ALL);
        self.write_reg(IMSC_OFFSET, 0);

        self.write_reg(CR_OFFSET, CR_UARTEN | CR_TXE | CR_RXE);

        Ok(())
    }

    fn write_byte(&mut self, byte: u8) {
        while self.read_reg(FR_OFFSET) & FR_TXFF != 0 {
            core::hint::spin_loop();
        }

        self.write_reg(DR_OFFSET, u32::from(byte));
    }

    fn read_byte(&mut self) -> u8 {
        while self.read_reg(FR_OFFSET) & FR_RXFE != 0 {
            core::hint::spin_loop();
        }

        (self.read_reg(DR_OFFSET) & 0xFF) as u8
    }

    fn flush(&mut self) {
        self.wait_idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::serial::SerialWriter;
    use crate::testing::MemorySpy;
    use core::fmt::Write;

    const BASE: usize = 0x3F20_1000;

    #[test]
    fn divisors_for_common_clocks() {
        let spy = MemorySpy::new();
        assert_eq!(
            Pl011::new(&spy, BASE, 4_000_000).calculate_divisors(115_200),
            Ok((2, 11))
        );
        assert_eq!(
            Pl011::new(&spy, BASE, 48_000_000).calculate_divisors(115_200),
            Ok((26, 3))
        );
        assert_eq!(
            Pl011::new(&spy, BASE, 4_000_000).calculate_divisors(0),
            Err(SerialError::InvalidBaudRate(0))
        );
        assert_eq!(
            Pl011::new(&spy, BASE, 4_000_000).calculate_divisors(1_000_000),
            Err(SerialError::InvalidBaudRate(1_000_000))
        );
    }

    #[test]
    fn configure_programs_divisors_and_enables() {
        let spy = MemorySpy::new();
        let mut uart = Pl011::new(&spy, BASE, 4_000_000);

        uart.configure(SerialConfig::new_8n1(115_200)).unwrap();

        assert_eq!(spy.value(BASE + IBRD_OFFSET), 2);
        assert_eq!(spy.value(BASE + FBRD_OFFSET), 11);
        assert_eq!(spy.value(BASE + LCRH_OFFSET), 0x70);
        assert_eq!(spy.value(BASE + CR_OFFSET), 0x301);
        assert_eq!(spy.writes_to(BASE + CR_OFFSET), vec![0, 0x301]);
    }

    #[test]
    fn configure_rejects_other_formats_untouched() {
        let spy = MemorySpy::new();
        let mut uart = Pl011::new(&spy, BASE, 4_000_000);
        let config = SerialConfig {
            parity: Parity::Even,
            ..SerialConfig::default()
        };

        assert_eq!(uart.configure(config), Err(SerialError::UnsupportedFormat));
        assert!(spy.accesses().is_empty());
    }

    #[test]
    fn writer_waits_for_fifo_and_expands_newlines() {
        let spy = MemorySpy::new();
        spy.script(BASE + FR_OFFSET, [FR_TXFF, 0]);
        let mut writer = SerialWriter(Pl011::new(&spy, BASE, 4_000_000));

        write!(writer, "ok\n").unwrap();

        assert_eq!(
            spy.writes_to(BASE + DR_OFFSET),
            vec![u32::from(b'o'), u32::from(b'k'), u32::from(b'\r'), u32::from(b'\n')]
        );
        assert_eq!(spy.reads_of(BASE + FR_OFFSET), 5);
    }

    #[test]
    fn read_byte_waits_for_data() {
        let spy = MemorySpy::new();
        spy.script(BASE + FR_OFFSET, [FR_RXFE, FR_RXFE, 0]);
        spy.set(BASE + DR_OFFSET, 0x141);
        let mut uart = Pl011::new(&spy, BASE, 4_000_000);

        assert_eq!(uart.read_byte(), b'A');
        assert_eq!(spy.reads_of(BASE + FR_OFFSET), 3);
    }
}
