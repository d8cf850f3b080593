//! Volatile register access for the real hardware.

use crate::hal::mmio::MemoryAccess;
use core::ptr::{read_volatile, write_volatile};

/// [`MemoryAccess`] backed by volatile loads and stores.
#[derive(Debug, Copy, Clone)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Create the register access port.
    ///
    /// # Safety
    ///
    /// - Every address later passed to this port must be a mapped device
    ///   register (or RAM) of the access width used.
    /// - Device memory must be mapped non-cacheable.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl MemoryAccess for Mmio {
    #[inline]
    fn read8(&self, address: usize) -> u8 {
        unsafe { read_volatile(address as *const u8) }
    }

    #[inline]
    fn write8(&self, address: usize, data: u8) {
        unsafe { write_volatile(address as *mut u8, data) }
    }

    #[inline]
    fn read16(&self, address: usize) -> u16 {
        unsafe { read_volatile(address as *const u16) }
    }

    #[inline]
    fn write16(&self, address: usize, data: u16) {
        unsafe { write_volatile(address as *mut u16, data) }
    }

    #[inline]
    fn read32(&self, address: usize) -> u32 {
        unsafe { read_volatile(address as *const u32) }
    }

    #[inline]
    fn write32(&self, address: usize, data: u32) {
        unsafe { write_volatile(address as *mut u32, data) }
    }
}

// SAFETY: Mmio holds no state; exclusive use of a register block is the
// owning driver's concern.
unsafe impl Send for Mmio {}
unsafe impl Sync for Mmio {}
