//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! This module defines the seams between the SoC drivers and the code that
//! uses them. Platform drivers implement these traits; the interrupt system,
//! the property protocol and the tests are written against them.
//!
//! # Available Interfaces
//!
//! - [`mmio`]: Register access port (real or recorded)
//! - [`interrupt`]: Interrupt controller management
//! - [`mailbox`]: Request/response transport to the VideoCore firmware
//! - [`timer`]: Hardware timers and delays
//! - [`gpio`]: General Purpose Input/Output control
//! - [`serial`]: Serial port (UART) communication

pub mod gpio;
pub mod interrupt;
pub mod mailbox;
pub mod mmio;
pub mod serial;
pub mod timer;
