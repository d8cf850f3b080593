//! BCM2837 GPIO Controller Driver

use crate::hal::gpio::{GpioController, GpioError, PinLevel, PullMode};
use crate::hal::mmio::MemoryAccess;

/// GPIO offset from the peripheral base.
const GPIO_OFFSET: usize = 0x20_0000;

// Register offsets
const GPFSEL0: usize = 0x00;
const GPSET0: usize = 0x1C;
const GPCLR0: usize = 0x28;
const GPLEV0: usize = 0x34;
#[cfg(feature = "bcm2837")]
const GPPUD: usize = 0x94;
#[cfg(feature = "bcm2837")]
const GPPUDCLK0: usize = 0x98;
#[cfg(feature = "bcm2711")]
const GPPUPPDN0: usize = 0xE4;

/// Highest pin number.
pub const MAX_PIN: u8 = 53;

/// Cycles to hold the pull-control signal before and after clocking it in.
const PULL_SETUP_CYCLES: u32 = 150;

/// GPIO function selection.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Function {
    Input = 0b000,
    Output = 0b001,
    Alt0 = 0b100,
    Alt1 = 0b101,
    Alt2 = 0b110,
    Alt3 = 0b111,
    Alt4 = 0b011,
    Alt5 = 0b010,
}

impl Function {
    /// Alternate function `alt` (0..=5).
    pub fn alt(alt: u8) -> Result<Self, GpioError> {
        Ok(match alt {
            0 => Function::Alt0,
            1 => Function::Alt1,
            2 => Function::Alt2,
            3 => Function::Alt3,
            4 => Function::Alt4,
            5 => Function::Alt5,
            _ => return Err(GpioError::InvalidFunction(alt)),
        })
    }
}

fn check_pin(pin: u8) -> Result<(), GpioError> {
    if pin <= MAX_PIN {
        Ok(())
    } else {
        Err(GpioError::InvalidPin(pin))
    }
}

fn pin_reg_and_bit(pin: u8) -> (usize, u32) {
    let reg = (pin / 32) as usize * 4;
    let bit = 1u32 << (pin % 32);
    (reg, bit)
}

fn delay_cycles(count: u32) {
    for _ in 0..count {
        common::arch::nop();
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

/// BCM2837 GPIO controller.
#[derive(Debug)]
pub struct Bcm2837Gpio<M: MemoryAccess> {
    mem: M,
    base: usize,
}

impl<M: MemoryAccess> Bcm2837Gpio<M> {
    pub const fn new(mem: M, peripheral_base: usize) -> Self {
        Self {
            mem,
            base: peripheral_base + GPIO_OFFSET,
        }
    }

    /// Select the function of a pin.
    pub fn set_function(&mut self, pin: u8, function: Function) -> Result<(), GpioError> {
        check_pin(pin)?;

        let register = self.base + GPFSEL0 + (pin / 10) as usize * 4;
        let shift = (pin % 10) * 3;
        self.mem
            .read_modify_write32(register, 0b111 << shift, function as u32, shift);
        Ok(())
    }

    /// Configure a pin for a specific alternate function.
    pub fn set_alt_function(&mut self, pin: u8, alt: u8) -> Result<(), GpioError> {
        self.set_function(pin, Function::alt(alt)?)
    }
}

impl<M: MemoryAccess> GpioController for Bcm2837Gpio<M> {
    type Pin = u8;

    #[cfg(feature = "bcm2837")]
    fn set_pull(&mut self, pin: u8, pull: PullMode) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (reg, bit) = pin_reg_and_bit(pin);
        let mode = match pull {
            PullMode::None => 0b00,
            PullMode::Down => 0b01,
            PullMode::Up => 0b10,
        };

        self.mem.write32(self.base + GPPUD, mode);
        delay_cycles(PULL_SETUP_CYCLES);
        self.mem.write32(self.base + GPPUDCLK0 + reg, bit);
        delay_cycles(PULL_SETUP_CYCLES);
        self.mem.write32(self.base + GPPUDCLK0 + reg, 0);
        Ok(())
    }

    #[cfg(feature = "bcm2711")]
    fn set_pull(&mut self, pin: u8, pull: PullMode) -> Result<(), GpioError> {
        check_pin(pin)?;
        let register = self.base + GPPUPPDN0 + (pin / 16) as usize * 4;
        let shift = (pin % 16) * 2;
        let mode = match pull {
            PullMode::None => 0b00,
            PullMode::Up => 0b01,
            PullMode::Down => 0b10,
        };

        self.mem.read_modify_write32(register, 0b11 << shift, mode, shift);
        Ok(())
    }

    fn set_high(&mut self, pin: u8) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (reg, bit) = pin_reg_and_bit(pin);
        self.mem.write32(self.base + GPSET0 + reg, bit);
        Ok(())
    }

    fn set_low(&mut self, pin: u8) -> Result<(), GpioError> {
        check_pin(pin)?;
        let (reg, bit) = pin_reg_and_bit(pin);
        self.mem.write32(self.base + GPCLR0 + reg, bit);
        Ok(())
    }

    fn read(&self, pin: u8) -> Result<PinLevel, GpioError> {
        check_pin(pin)?;
        let (reg, bit) = pin_reg_and_bit(pin);
        Ok(PinLevel::from(self.mem.read32(self.base + GPLEV0 + reg) & bit != 0))
    }
}
