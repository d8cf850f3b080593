//! Platform Abstraction Layer
//!
//! Selects the SoC at compile time and exposes its memory map. The drivers
//! under [`bcm2837`] take their base addresses as constructor arguments; the
//! constants here are what the kernel passes in.
//!
//! # Usage
//!
//! ```ignore
//! use drivers::platform::{self, bcm2837::Bcm2837InterruptController};
//!
//! let map = platform::memory_map();
//! let intc = Bcm2837InterruptController::new(mmio, map.peripheral_base, map.arm_local_base);
//! ```

pub mod bcm2837;

/// Platform memory map information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryMap {
    /// Start of RAM
    pub ram_start: usize,
    /// Start of the SoC peripheral region (CPU physical)
    pub peripheral_base: usize,
    /// Size of the peripheral region
    pub peripheral_size: usize,
    /// Start of the ARM-local peripherals (core timers, per-core IRQ routing)
    pub arm_local_base: usize,
    /// Kernel load address
    pub kernel_start: usize,
}

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(all(feature = "bcm2837", feature = "bcm2711"))] {
        compile_error!("Multiple platforms selected! Choose only one: bcm2837 OR bcm2711");
    } else if #[cfg(feature = "bcm2837")] {
        pub const PLATFORM_NAME: &str = "BCM2837 (Raspberry Pi 3)";
        pub const PERIPHERAL_BASE: usize = 0x3F00_0000;
        pub const PERIPHERAL_SIZE: usize = 0x0100_0000;
        pub const ARM_LOCAL_BASE: usize = 0x4000_0000;
    } else if #[cfg(feature = "bcm2711")] {
        pub const PLATFORM_NAME: &str = "BCM2711 (Raspberry Pi 4, legacy interrupts)";
        pub const PERIPHERAL_BASE: usize = 0xFE00_0000;
        pub const PERIPHERAL_SIZE: usize = 0x0180_0000;
        pub const ARM_LOCAL_BASE: usize = 0xFF80_0000;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features bcm2837\n\
            Or:  cargo build --features bcm2711"
        );
    }
}

/// Static memory map of the selected platform.
pub const fn memory_map() -> MemoryMap {
    MemoryMap {
        ram_start: 0x0000_0000,
        peripheral_base: PERIPHERAL_BASE,
        peripheral_size: PERIPHERAL_SIZE,
        arm_local_base: ARM_LOCAL_BASE,
        kernel_start: 0x8_0000,
    }
}
