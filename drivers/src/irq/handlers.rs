use crate::hal::interrupt::{InterruptError, IrqNumber};

/// Capacity of the handler table. Controllers report fewer lines.
pub const MAX_IRQ_LINES: usize = 256;

/// Interrupt handler.
///
/// Handlers run in interrupt context with IRQs masked. They carry their own
/// state and receive the line (or FIQ source) that fired.
pub trait IrqHandler: Sync {
    fn handle(&self, irq: IrqNumber);
}

impl<F> IrqHandler for F
where
    F: Fn(IrqNumber) + Sync,
{
    fn handle(&self, irq: IrqNumber) {
        self(irq)
    }
}

/// One optional handler per line.
pub(super) struct HandlerTable<'h> {
    slots: [Option<&'h dyn IrqHandler>; MAX_IRQ_LINES],
}

impl<'h> HandlerTable<'h> {
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_IRQ_LINES],
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_IRQ_LINES];
    }

    pub fn get(&self, irq: IrqNumber) -> Option<&'h dyn IrqHandler> {
        self.slots.get(irq as usize).copied().flatten()
    }

    pub fn insert(
        &mut self,
        irq: IrqNumber,
        handler: &'h dyn IrqHandler,
    ) -> Result<(), InterruptError> {
        let slot = self
            .slots
            .get_mut(irq as usize)
            .ok_or(InterruptError::InvalidLine(irq))?;
        if slot.is_some() {
            return Err(InterruptError::AlreadyRegistered(irq));
        }
        *slot = Some(handler);
        Ok(())
    }

    pub fn remove(&mut self, irq: IrqNumber) -> Result<&'h dyn IrqHandler, InterruptError> {
        self.slots
            .get_mut(irq as usize)
            .ok_or(InterruptError::InvalidLine(irq))?
            .take()
            .ok_or(InterruptError::NotRegistered(irq))
    }

    pub fn registered(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
