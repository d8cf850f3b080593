//! Memory shared with the VideoCore.
//!
//! The GPU sees RAM through its own bus addresses. Requests handed over the
//! mailbox must live in memory the GPU observes coherently and must be
//! referenced by their uncached bus alias.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

/// Uncached alias of RAM in the GPU address space.
pub const GPU_MEM_BASE: u32 = 0xC000_0000;

/// Size of one coherent page.
pub const COHERENT_PAGE_SIZE: usize = 4096;

/// Translate a CPU physical address to the GPU's uncached bus alias.
pub const fn arm_to_gpu(address: usize) -> u32 {
    ((address as u32) & !GPU_MEM_BASE) | GPU_MEM_BASE
}

/// Translate a GPU bus address back to a CPU physical address.
pub const fn gpu_to_arm(address: u32) -> usize {
    (address & !GPU_MEM_BASE) as usize
}

/// Fixed uses of the coherent region.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoherentPageSlot {
    /// Transfer buffer of the property mailbox channel.
    PropertyMailbox,
}

/// One page of CPU/GPU shared memory with an exclusive claim flag.
#[repr(C, align(16))]
pub struct CoherentPage {
    bytes: UnsafeCell<[u8; COHERENT_PAGE_SIZE]>,
    claimed: AtomicBool,
}

// SAFETY: the bytes are only reachable through a `PageClaim`, and at most
// one claim exists at a time.
unsafe impl Sync for CoherentPage {}

impl CoherentPage {
    pub const fn new() -> Self {
        Self {
            bytes: UnsafeCell::new([0; COHERENT_PAGE_SIZE]),
            claimed: AtomicBool::new(false),
        }
    }

    /// Take exclusive use of the page. `None` while another claim is live.
    pub fn claim(&self) -> Option<PageClaim<'_>> {
        self.claimed
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;
        Some(PageClaim { page: self })
    }

    /// CPU address of the first byte.
    pub fn as_ptr(&self) -> *mut u8 {
        self.bytes.get().cast()
    }

    /// Address the GPU uses for this page.
    pub fn bus_address(&self) -> u32 {
        arm_to_gpu(self.as_ptr() as usize)
    }
}

impl Default for CoherentPage {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive use of a [`CoherentPage`], released on drop.
pub struct PageClaim<'a> {
    page: &'a CoherentPage,
}

impl PageClaim<'_> {
    pub fn bytes(&self) -> &[u8] {
        // SAFETY: the claim is exclusive; see `CoherentPage::claim`.
        unsafe { &*self.page.bytes.get() }
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: the claim is exclusive and `&mut self` rules out aliasing
        // through this claim.
        unsafe { &mut *self.page.bytes.get() }
    }

    pub fn bus_address(&self) -> u32 {
        self.page.bus_address()
    }
}

impl Drop for PageClaim<'_> {
    fn drop(&mut self) {
        self.page.claimed.store(false, Ordering::Release);
    }
}

static PROPERTY_MAILBOX_PAGE: CoherentPage = CoherentPage::new();

/// The coherent page reserved for `slot`.
pub fn coherent_page(slot: CoherentPageSlot) -> &'static CoherentPage {
    match slot {
        CoherentPageSlot::PropertyMailbox => &PROPERTY_MAILBOX_PAGE,
    }
}
