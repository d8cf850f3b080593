//! Host stand-ins for the hardware, shared by the unit tests.

use crate::hal::mailbox::{Mailbox, MailboxError};
use crate::hal::mmio::MemoryAccess;
use crate::hal::timer::Delay;
use crate::platform::bcm2837::memory::{COHERENT_PAGE_SIZE, CoherentPage};
use crate::property::tag::{read_u32, write_u32};
use common::sync::irq::IrqControl;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

/// One recorded register access. Narrow accesses are widened to `u32`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    Read(usize),
    Write(usize, u32),
}

#[derive(Default)]
struct SpyState {
    values: HashMap<usize, u32>,
    scripted: HashMap<usize, VecDeque<u32>>,
    log: Vec<Access>,
}

/// Recording [`MemoryAccess`].
///
/// Reads pop the address's scripted queue first and fall back to the last
/// value written or set (zero if none). Every access is logged in order.
#[derive(Default)]
pub struct MemorySpy {
    state: RefCell<SpyState>,
}

impl MemorySpy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a register value without logging an access.
    pub fn set(&self, address: usize, value: u32) {
        self.state.borrow_mut().values.insert(address, value);
    }

    /// Queue values returned by the next reads of `address`.
    pub fn script(&self, address: usize, values: impl IntoIterator<Item = u32>) {
        self.state
            .borrow_mut()
            .scripted
            .entry(address)
            .or_default()
            .extend(values);
    }

    pub fn value(&self, address: usize) -> u32 {
        self.state.borrow().values.get(&address).copied().unwrap_or(0)
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.state.borrow().log.clone()
    }

    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state
            .borrow()
            .log
            .iter()
            .filter_map(|access| match *access {
                Access::Write(address, value) => Some((address, value)),
                Access::Read(_) => None,
            })
            .collect()
    }

    pub fn writes_to(&self, address: usize) -> Vec<u32> {
        self.writes()
            .into_iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn reads_of(&self, address: usize) -> usize {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|access| **access == Access::Read(address))
            .count()
    }

    pub fn clear_log(&self) {
        self.state.borrow_mut().log.clear();
    }

    fn load(&self, address: usize) -> u32 {
        let mut state = self.state.borrow_mut();
        state.log.push(Access::Read(address));
        let scripted = state
            .scripted
            .get_mut(&address)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(value) => value,
            None => state.values.get(&address).copied().unwrap_or(0),
        }
    }

    fn store(&self, address: usize, value: u32) {
        let mut state = self.state.borrow_mut();
        state.log.push(Access::Write(address, value));
        state.values.insert(address, value);
    }
}

impl MemoryAccess for MemorySpy {
    fn read8(&self, address: usize) -> u8 {
        self.load(address) as u8
    }

    fn write8(&self, address: usize, data: u8) {
        self.store(address, u32::from(data));
    }

    fn read16(&self, address: usize) -> u16 {
        self.load(address) as u16
    }

    fn write16(&self, address: usize, data: u16) {
        self.store(address, u32::from(data));
    }

    fn read32(&self, address: usize) -> u32 {
        self.load(address)
    }

    fn write32(&self, address: usize, data: u32) {
        self.store(address, data);
    }
}

/// Delay source that returns at once and remembers what it was asked for.
#[derive(Default)]
pub struct NoDelay {
    calls: RefCell<Vec<u32>>,
}

impl NoDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested delays in microseconds, in call order.
    pub fn calls(&self) -> Vec<u32> {
        self.calls.borrow().clone()
    }
}

impl Delay for NoDelay {
    fn delay_us(&self, us: u32) {
        self.calls.borrow_mut().push(us);
    }
}

thread_local! {
    static FAKE_IRQ_ENABLED: Cell<bool> = const { Cell::new(false) };
}

/// Per-thread CPU IRQ mask, so parallel tests do not see each other.
pub struct FakeIrq;

impl FakeIrq {
    pub fn is_enabled() -> bool {
        FAKE_IRQ_ENABLED.with(Cell::get)
    }

    pub fn reset() {
        FAKE_IRQ_ENABLED.with(|enabled| enabled.set(false));
    }
}

impl IrqControl for FakeIrq {
    type State = bool;

    fn disable() -> bool {
        FAKE_IRQ_ENABLED.with(|enabled| enabled.replace(false))
    }

    fn restore(prev_enabled: bool) {
        if prev_enabled {
            Self::enable();
        }
    }

    fn enable() {
        FAKE_IRQ_ENABLED.with(|enabled| enabled.set(true));
    }
}

/// Stand-in for the VideoCore firmware behind a property mailbox.
///
/// Snapshots each request found in the coherent page, then writes a canned
/// answer for the first tag into the page, the way the GPU would.
pub struct FakeFirmware<'p> {
    page: &'p CoherentPage,
    code: u32,
    status: u32,
    words: Vec<u32>,
    reply: Option<u32>,
    failure: Option<MailboxError>,
    addresses: Vec<u32>,
    requests: Vec<Vec<u8>>,
}

impl<'p> FakeFirmware<'p> {
    /// Answer every request with success, tag `status` and payload `words`.
    pub fn answering(page: &'p CoherentPage, status: u32, words: &[u32]) -> Self {
        Self {
            page,
            code: 0x8000_0000,
            status,
            words: words.to_vec(),
            reply: None,
            failure: None,
            addresses: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Reply with `address` instead of echoing the request address.
    pub fn reply_with(&mut self, address: u32) {
        self.reply = Some(address);
    }

    /// Put `code` in the buffer's response code field.
    pub fn respond_with_code(&mut self, code: u32) {
        self.code = code;
    }

    /// Fail the transport instead of answering.
    pub fn fail_with(&mut self, err: MailboxError) {
        self.failure = Some(err);
    }

    pub fn calls(&self) -> usize {
        self.addresses.len()
    }

    pub fn addresses(&self) -> Vec<u32> {
        self.addresses.clone()
    }

    /// Request buffers as they were when the doorbell rang.
    pub fn requests(&self) -> &[Vec<u8>] {
        &self.requests
    }
}

impl Mailbox for FakeFirmware<'_> {
    fn write_read(&mut self, address: u32) -> Result<u32, MailboxError> {
        self.addresses.push(address);
        if let Some(err) = self.failure {
            return Err(err);
        }

        // SAFETY: the interface holds the page claim but no live reference
        // into the bytes while the mailbox call is in progress.
        let buffer =
            unsafe { std::slice::from_raw_parts_mut(self.page.as_ptr(), COHERENT_PAGE_SIZE) };
        let total = read_u32(buffer, 0) as usize;
        self.requests.push(buffer[..total].to_vec());

        write_u32(buffer, 4, self.code);
        write_u32(buffer, 16, self.status);
        for (index, word) in self.words.iter().enumerate() {
            write_u32(buffer, 20 + 4 * index, *word);
        }

        Ok(self.reply.unwrap_or(address))
    }
}
