//! Memory-mapped register access.
//!
//! Every driver in this crate reaches its registers through
//! [`MemoryAccess`] instead of dereferencing raw pointers itself, so a
//! recording implementation can stand in for the hardware in tests.

/// Register access port.
///
/// Addresses are CPU physical addresses. Methods take `&self`: the real
/// implementation is stateless and recording implementations use interior
/// mutability.
pub trait MemoryAccess {
    fn read8(&self, address: usize) -> u8;
    fn write8(&self, address: usize, data: u8);
    fn read16(&self, address: usize) -> u16;
    fn write16(&self, address: usize, data: u16);
    fn read32(&self, address: usize) -> u32;
    fn write32(&self, address: usize, data: u32);

    /// `write((read(address) & !mask) | ((data << shift) & mask))`
    fn read_modify_write8(&self, address: usize, mask: u8, data: u8, shift: u8) {
        let shifted = data.checked_shl(u32::from(shift)).unwrap_or(0);
        let value = (self.read8(address) & !mask) | (shifted & mask);
        self.write8(address, value);
    }

    /// `write((read(address) & !mask) | ((data << shift) & mask))`
    fn read_modify_write16(&self, address: usize, mask: u16, data: u16, shift: u8) {
        let shifted = data.checked_shl(u32::from(shift)).unwrap_or(0);
        let value = (self.read16(address) & !mask) | (shifted & mask);
        self.write16(address, value);
    }

    /// `write((read(address) & !mask) | ((data << shift) & mask))`
    fn read_modify_write32(&self, address: usize, mask: u32, data: u32, shift: u8) {
        let shifted = data.checked_shl(u32::from(shift)).unwrap_or(0);
        let value = (self.read32(address) & !mask) | (shifted & mask);
        self.write32(address, value);
    }
}

impl<M: MemoryAccess + ?Sized> MemoryAccess for &M {
    #[inline]
    fn read8(&self, address: usize) -> u8 {
        (**self).read8(address)
    }

    #[inline]
    fn write8(&self, address: usize, data: u8) {
        (**self).write8(address, data)
    }

    #[inline]
    fn read16(&self, address: usize) -> u16 {
        (**self).read16(address)
    }

    #[inline]
    fn write16(&self, address: usize, data: u16) {
        (**self).write16(address, data)
    }

    #[inline]
    fn read32(&self, address: usize) -> u32 {
        (**self).read32(address)
    }

    #[inline]
    fn write32(&self, address: usize, data: u32) {
        (**self).write32(address, data)
    }
}
