//! GPIO abstraction.
//!
//! Pin muxing is SoC specific and lives on the platform driver; the trait
//! covers pulls and plain digital I/O.

use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinLevel {
    Low,
    High,
}

impl From<bool> for PinLevel {
    fn from(value: bool) -> Self {
        if value { PinLevel::High } else { PinLevel::Low }
    }
}

/// Pad pull resistor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PullMode {
    /// Floating.
    None,
    Up,
    Down,
}

/// GPIO errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GpioError {
    /// Pin number beyond the controller's last pin.
    InvalidPin(u8),
    /// Alternate function number beyond ALT5.
    InvalidFunction(u8),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "GPIO pin {pin} does not exist"),
            Self::InvalidFunction(alt) => write!(f, "ALT{alt} is not a pin function"),
        }
    }
}

/// Bank of digital pins.
pub trait GpioController {
    type Pin: Copy + Clone;

    fn set_pull(&mut self, pin: Self::Pin, pull: PullMode) -> Result<(), GpioError>;

    /// Drive `pin` high. Only visible on pins configured as outputs.
    fn set_high(&mut self, pin: Self::Pin) -> Result<(), GpioError>;

    fn set_low(&mut self, pin: Self::Pin) -> Result<(), GpioError>;

    /// Sample the level currently on the pad.
    fn read(&self, pin: Self::Pin) -> Result<PinLevel, GpioError>;

    fn set_level(&mut self, pin: Self::Pin, level: PinLevel) -> Result<(), GpioError> {
        match level {
            PinLevel::High => self.set_high(pin),
            PinLevel::Low => self.set_low(pin),
        }
    }
}
