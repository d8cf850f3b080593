//! CPU-level primitives shared by the driver and kernel crates.
//!
//! - [`arch`]: interrupt masking and memory barriers for the running CPU
//! - [`sync`]: interrupt-aware locking built on the `spin` crate

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod sync;
