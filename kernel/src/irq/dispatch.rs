//! Interrupt dispatch, called from the exception vectors.

use log::{trace, warn};

use super::INTERRUPTS;

/// Service every pending IRQ line.
pub fn dispatch_irq() {
    let mut interrupts = INTERRUPTS.lock();
    match interrupts.as_mut() {
        Some(system) => {
            let handled = system.dispatch_irq();
            trace!("IRQ: {handled} handler(s) ran");
        }
        None => warn!("IRQ before the interrupt system is up"),
    }
}

/// Run the FIQ handler.
///
/// `DAIF.F` stays set after boot, so this only runs once something unmasks
/// FIQs. An FIQ that lands while the lock is held is dropped; it must not
/// spin on the lock or log, since neither lock masks FIQs.
pub fn dispatch_fiq() {
    if let Some(interrupts) = INTERRUPTS.try_lock() {
        if let Some(system) = interrupts.as_ref() {
            system.dispatch_fiq();
        }
    }
}
