//! Hardware Driver Subsystem
//!
//! This crate provides a layered architecture for the Raspberry Pi's
//! interrupt and firmware plumbing:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent trait definitions
//! - [`mmio`]: Volatile register access for the real hardware
//! - [`platform`]: Platform-specific drivers (SoC level)
//! - [`peripheral`]: Reusable peripheral drivers
//! - [`irq`]: Interrupt handler table and dispatch
//! - [`property`]: VideoCore property-tag protocol
//!
//! # Design Principles
//!
//! 1. **Separation of Concerns**: Platform code is separate from peripheral code
//! 2. **Injected Hardware Access**: Drivers reach registers through
//!    [`hal::mmio::MemoryAccess`], so every driver runs against a recording
//!    double on the host
//! 3. **Explicit Errors**: Fallible operations return per-module error enums

#![cfg_attr(not(test), no_std)]

pub mod hal;
pub mod irq;
pub mod mmio;
pub mod peripheral;
pub mod platform;
pub mod property;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use hal::gpio::{GpioController, PinLevel};
pub use hal::interrupt::{InterruptController, InterruptError, IrqNumber};
pub use hal::mailbox::{Mailbox, MailboxError};
pub use hal::serial::{SerialConfig, SerialPort};
pub use hal::timer::{Delay, Timer};
pub use irq::{InterruptSystem, IrqHandler, SingleInterruptSystem};
pub use mmio::Mmio;
pub use property::{PropertiesInterface, PropertyError, RpiProperties};
