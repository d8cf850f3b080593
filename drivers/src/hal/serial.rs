//! Serial console abstraction.
//!
//! The kernel logs through a [`SerialWriter`] wrapped around whichever
//! [`SerialPort`] the board brought up.

use core::fmt;

/// Line settings applied by [`SerialPort::configure`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// Eight data bits, no parity, one stop bit.
    pub const fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new_8n1(115200)
    }
}

/// Data bits per character.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Serial port errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// Baud rate of zero or a divisor the hardware cannot hold.
    InvalidBaudRate(u32),
    /// Frame format the port does not support.
    UnsupportedFormat,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaudRate(baud) => write!(f, "baud rate {baud} not reachable"),
            Self::UnsupportedFormat => write!(f, "unsupported frame format"),
        }
    }
}

/// A UART that can be configured and driven byte by byte.
///
/// Transfers block on the FIFO flags. Nothing is sent or received before
/// [`SerialPort::configure`] succeeds.
pub trait SerialPort {
    /// Program the line settings and enable the port.
    fn configure(&mut self, config: SerialConfig) -> Result<(), SerialError>;

    /// Queue one byte, waiting for FIFO space.
    fn write_byte(&mut self, byte: u8);

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Wait for and return the next received byte.
    fn read_byte(&mut self) -> u8;

    /// Wait until the transmitter is idle.
    fn flush(&mut self);
}

/// [`fmt::Write`] adapter that turns `\n` into `\r\n`.
pub struct SerialWriter<T: SerialPort>(pub T);

impl<T: SerialPort> fmt::Write for SerialWriter<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.0.write_byte(b'\r');
            }
            self.0.write_byte(byte);
        }
        Ok(())
    }
}
