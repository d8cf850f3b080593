//! Typed property requests.

use log::debug;

use super::tag::{ClockId, PropertyId, TAG_HEADER_SIZE, read_u32, write_u32};
use super::{PropertiesInterface, PropertyError};
use crate::hal::mailbox::Mailbox;

/// Largest payload, in words, of the requests below.
const MAX_PAYLOAD_WORDS: usize = 3;

/// A region of memory reported by the firmware.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: u32,
    pub size: u32,
}

/// Board, memory, clock and temperature queries.
pub struct RpiProperties<'p, B: Mailbox> {
    interface: PropertiesInterface<'p, B>,
}

impl<'p, B: Mailbox> RpiProperties<'p, B> {
    pub fn new(interface: PropertiesInterface<'p, B>) -> Self {
        Self { interface }
    }

    /// Send one tag whose payload is `W` words, request and response alike.
    fn request<const W: usize>(
        &mut self,
        id: PropertyId,
        request: [u32; W],
    ) -> Result<[u32; W], PropertyError> {
        const { assert!(W >= 1 && W <= MAX_PAYLOAD_WORDS) };

        let mut buffer = [0u8; TAG_HEADER_SIZE + 4 * MAX_PAYLOAD_WORDS];
        let tag = &mut buffer[..TAG_HEADER_SIZE + 4 * W];
        for (index, word) in request.iter().enumerate() {
            write_u32(tag, TAG_HEADER_SIZE + 4 * index, *word);
        }

        self.interface.get_tag(id, tag)?;

        let mut response = [0u32; W];
        for (index, word) in response.iter_mut().enumerate() {
            *word = read_u32(tag, TAG_HEADER_SIZE + 4 * index);
        }
        Ok(response)
    }

    pub fn firmware_revision(&mut self) -> Result<u32, PropertyError> {
        let [revision] = self.request(PropertyId::GetFirmwareRevision, [0])?;
        debug!("firmware revision {revision:#x}");
        Ok(revision)
    }

    pub fn board_model(&mut self) -> Result<u32, PropertyError> {
        let [model] = self.request(PropertyId::GetBoardModel, [0])?;
        Ok(model)
    }

    pub fn board_revision(&mut self) -> Result<u32, PropertyError> {
        let [revision] = self.request(PropertyId::GetBoardRevision, [0])?;
        debug!("board revision {revision:#x}");
        Ok(revision)
    }

    /// Six MAC bytes in transmission order.
    pub fn board_mac_address(&mut self) -> Result<[u8; 6], PropertyError> {
        let [low, high] = self.request(PropertyId::GetBoardMacAddress, [0, 0])?;
        let low = low.to_le_bytes();
        let high = high.to_le_bytes();
        Ok([low[0], low[1], low[2], low[3], high[0], high[1]])
    }

    pub fn board_serial(&mut self) -> Result<u64, PropertyError> {
        let [low, high] = self.request(PropertyId::GetBoardSerial, [0, 0])?;
        let serial = (u64::from(high) << 32) | u64::from(low);
        debug!("board serial {serial:016x}");
        Ok(serial)
    }

    pub fn arm_memory(&mut self) -> Result<MemoryRegion, PropertyError> {
        let [base, size] = self.request(PropertyId::GetArmMemory, [0, 0])?;
        debug!("ARM memory {base:#010x}, {size:#x} bytes");
        Ok(MemoryRegion { base, size })
    }

    pub fn vc_memory(&mut self) -> Result<MemoryRegion, PropertyError> {
        let [base, size] = self.request(PropertyId::GetVcMemory, [0, 0])?;
        debug!("VC memory {base:#010x}, {size:#x} bytes");
        Ok(MemoryRegion { base, size })
    }

    fn clock_query(&mut self, id: PropertyId, clock: ClockId) -> Result<u32, PropertyError> {
        let [_, rate, _] = self.request(id, [clock.into(), 0, 0])?;
        debug!("{id:?} {clock:?}: {rate} Hz");
        Ok(rate)
    }

    /// Current rate of `clock` in Hz.
    pub fn clock_rate(&mut self, clock: ClockId) -> Result<u32, PropertyError> {
        self.clock_query(PropertyId::GetClockRate, clock)
    }

    pub fn max_clock_rate(&mut self, clock: ClockId) -> Result<u32, PropertyError> {
        self.clock_query(PropertyId::GetMaxClockRate, clock)
    }

    pub fn min_clock_rate(&mut self, clock: ClockId) -> Result<u32, PropertyError> {
        self.clock_query(PropertyId::GetMinClockRate, clock)
    }

    /// Rate of `clock` as measured by the firmware.
    pub fn measured_clock_rate(&mut self, clock: ClockId) -> Result<u32, PropertyError> {
        self.clock_query(PropertyId::GetClockRateMeasured, clock)
    }

    /// Request `rate_hz` for `clock`. With `skip_turbo` the firmware leaves
    /// the turbo setting alone when changing the ARM clock.
    pub fn set_clock_rate(
        &mut self,
        clock: ClockId,
        rate_hz: u32,
        skip_turbo: bool,
    ) -> Result<(), PropertyError> {
        self.request(
            PropertyId::SetClockRate,
            [clock.into(), rate_hz, u32::from(skip_turbo)],
        )?;
        debug!("{clock:?} clock set to {rate_hz} Hz");
        Ok(())
    }

    /// SoC temperature in thousandths of a degree Celsius.
    pub fn temperature(&mut self) -> Result<u32, PropertyError> {
        let [_, value] = self.request(PropertyId::GetTemperature, [0, 0])?;
        Ok(value)
    }
}
