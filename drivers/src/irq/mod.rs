//! Interrupt dispatch.
//!
//! [`InterruptSystem`] owns the per-line handler table and the single FIQ
//! slot, keeps the interrupt controller's masks in step with the table and
//! is what the IRQ exception vector calls into.
//!
//! # Lifecycle
//!
//! ```text
//! new() --initialize()--> initialized --drop--> every line masked
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut irqs = InterruptSystem::<_, CpuIrq>::new(controller);
//! irqs.initialize();
//! irqs.attach_irq_handler(SYSTEM_TIMER_1, &TICK);
//!
//! // from the exception vector
//! irqs.dispatch_irq();
//! ```

mod handlers;
mod single;
mod system;

pub use handlers::{IrqHandler, MAX_IRQ_LINES};
pub use single::SingleInterruptSystem;
pub use system::InterruptSystem;
