//! Property tag layout and identifiers.
//!
//! ```text
//! offset  0: tag id
//! offset  4: payload size in bytes
//! offset  8: status (request 0, response bit 31 | response length)
//! offset 12: payload
//! ```
//!
//! All fields are little-endian.

/// Size of the tag header preceding the payload.
pub const TAG_HEADER_SIZE: usize = 12;

/// Smallest valid tag buffer: the header and one payload word.
pub const MIN_TAG_SIZE: usize = TAG_HEADER_SIZE + 4;

/// Set by the firmware in the status word of every tag it processed.
pub const TAG_RESPONSE_BIT: u32 = 1 << 31;

pub(crate) const TAG_ID_OFFSET: usize = 0;
pub(crate) const TAG_SIZE_OFFSET: usize = 4;
pub(crate) const TAG_STATUS_OFFSET: usize = 8;

/// Firmware property tags.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum PropertyId {
    End = 0x0000_0000,
    GetFirmwareRevision = 0x0000_0001,
    SetCursorInfo = 0x0000_8010,
    SetCursorState = 0x0000_8011,
    GetBoardModel = 0x0001_0001,
    GetBoardRevision = 0x0001_0002,
    GetBoardMacAddress = 0x0001_0003,
    GetBoardSerial = 0x0001_0004,
    GetArmMemory = 0x0001_0005,
    GetVcMemory = 0x0001_0006,
    GetPowerState = 0x0002_0001,
    SetPowerState = 0x0002_8001,
    GetClockRate = 0x0003_0002,
    GetMaxClockRate = 0x0003_0004,
    GetTemperature = 0x0003_0006,
    GetMinClockRate = 0x0003_0007,
    GetTurbo = 0x0003_0009,
    GetMaxTemperature = 0x0003_000A,
    GetEdidBlock = 0x0003_0020,
    GetLedState = 0x0003_0041,
    GetThrottled = 0x0003_0046,
    GetClockRateMeasured = 0x0003_0047,
    NotifyXhciReset = 0x0003_0058,
    TestLedState = 0x0003_4041,
    SetClockRate = 0x0003_8002,
    SetTurbo = 0x0003_8009,
    SetDomainState = 0x0003_8030,
    SetLedState = 0x0003_8041,
    SetSdhostClock = 0x0003_8042,
    AllocateBuffer = 0x0004_0001,
    GetDisplayDimensions = 0x0004_0003,
    GetPitch = 0x0004_0008,
    GetTouchBuffer = 0x0004_000F,
    GetGpioVirtualBuffer = 0x0004_0010,
    GetNumDisplays = 0x0004_0013,
    SetPhysicalWidthHeight = 0x0004_8003,
    SetVirtualWidthHeight = 0x0004_8004,
    SetDepth = 0x0004_8005,
    SetPixelOrder = 0x0004_8006,
    SetVirtualOffset = 0x0004_8009,
    SetPalette = 0x0004_800B,
    WaitForVsync = 0x0004_800E,
    SetBacklight = 0x0004_800F,
    SetDisplayNumber = 0x0004_8013,
    SetTouchBuffer = 0x0004_801F,
    SetGpioVirtualBuffer = 0x0004_8020,
    GetCommandLine = 0x0005_0001,
    GetDmaChannels = 0x0006_0001,
}

impl From<PropertyId> for u32 {
    fn from(id: PropertyId) -> u32 {
        id as u32
    }
}

/// Clocks addressable through the clock-rate tags.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum ClockId {
    Emmc = 1,
    Uart = 2,
    Arm = 3,
    Core = 4,
    Emmc2 = 12,
    PixelBvb = 14,
}

impl From<ClockId> for u32 {
    fn from(id: ClockId) -> u32 {
        id as u32
    }
}

/// Read the little-endian word at `offset`.
///
/// Panics if `bytes` is shorter than `offset + 4`; callers check sizes first.
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

/// Store `value` little-endian at `offset`.
pub(crate) fn write_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
