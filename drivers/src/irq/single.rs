use log::trace;

use super::handlers::IrqHandler;
use crate::hal::interrupt::InterruptError;

/// Interrupt system with a single handler slot.
///
/// For parts that raise one combined per-core signal: whatever fires, the
/// one handler runs and is passed line 0. Masking is left to the caller.
#[derive(Default)]
pub struct SingleInterruptSystem<'h> {
    handler: Option<&'h dyn IrqHandler>,
    initialized: bool,
}

impl<'h> SingleInterruptSystem<'h> {
    pub const fn new() -> Self {
        Self {
            handler: None,
            initialized: false,
        }
    }

    /// Idempotent. Clears the slot the first time.
    pub fn initialize(&mut self) {
        if !self.initialized {
            self.handler = None;
            self.initialized = true;
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn register_irq_handler(
        &mut self,
        handler: &'h dyn IrqHandler,
    ) -> Result<(), InterruptError> {
        if self.handler.is_some() {
            return Err(InterruptError::AlreadyRegistered(0));
        }
        self.handler = Some(handler);
        trace!("single IRQ handler registered");
        Ok(())
    }

    pub fn unregister_irq_handler(&mut self) -> Result<(), InterruptError> {
        self.handler
            .take()
            .map(|_| ())
            .ok_or(InterruptError::NotRegistered(0))
    }

    /// Run the handler. Returns `false` if none is registered.
    pub fn dispatch(&self) -> bool {
        match self.handler {
            Some(handler) => {
                handler.handle(0);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::interrupt::IrqNumber;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn handler_runs_on_every_dispatch() {
        let calls = AtomicUsize::new(0);
        let handler = |_: IrqNumber| {
            calls.fetch_add(1, Ordering::SeqCst);
        };
        let mut system = SingleInterruptSystem::new();
        system.initialize();

        assert!(!system.dispatch());
        system.register_irq_handler(&handler).unwrap();
        assert!(system.dispatch());
        assert!(system.dispatch());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn single_slot_discipline() {
        let handler = |_: IrqNumber| {};
        let mut system = SingleInterruptSystem::new();

        assert_eq!(
            system.unregister_irq_handler(),
            Err(InterruptError::NotRegistered(0))
        );
        system.register_irq_handler(&handler).unwrap();
        assert_eq!(
            system.register_irq_handler(&handler),
            Err(InterruptError::AlreadyRegistered(0))
        );
        system.unregister_irq_handler().unwrap();
        system.register_irq_handler(&handler).unwrap();
    }
}
