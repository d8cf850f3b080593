//! Peripheral Drivers
//!
//! This module contains drivers for reusable peripherals that
//! can be found across different platforms.
//!
//! # Available Peripherals
//!
//! - [`pl011`]: ARM PrimeCell PL011 UART, the kernel's console and log sink

pub mod pl011;
