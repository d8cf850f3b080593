//! Kernel interrupt plumbing.
//!
//! The interrupt system lives behind an [`IrqSpinLock`] so registration at
//! task level never races the vector. Handlers run with the lock held and
//! must not take it again.

pub mod dispatch;
pub mod handlers;

use common::arch::CpuIrq;
use common::sync::IrqSpinLock;
use drivers::InterruptSystem;
use drivers::Mmio;
use drivers::platform::bcm2837::Bcm2837InterruptController;

pub type KernelInterrupts = InterruptSystem<'static, Bcm2837InterruptController<Mmio>, CpuIrq>;

/// Installed by [`crate::kcore::init::kernel_init`].
pub static INTERRUPTS: IrqSpinLock<Option<KernelInterrupts>, CpuIrq> = IrqSpinLock::new(None);
