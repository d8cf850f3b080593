use core::marker::PhantomData;

use common::sync::irq::IrqControl;
use log::{debug, trace, warn};

use super::handlers::{HandlerTable, IrqHandler, MAX_IRQ_LINES};
use crate::hal::interrupt::{InterruptController, InterruptError, IrqNumber};

#[derive(Copy, Clone)]
struct FiqBinding<'h> {
    source: u32,
    handler: &'h dyn IrqHandler,
}

/// Multi-line interrupt system.
///
/// `C` is the interrupt controller, `I` masks and unmasks IRQs at the CPU.
/// Handlers are borrowed for `'h`; the kernel registers `'static` ones.
pub struct InterruptSystem<'h, C: InterruptController, I: IrqControl> {
    controller: C,
    handlers: HandlerTable<'h>,
    fiq: Option<FiqBinding<'h>>,
    initialized: bool,
    _cpu: PhantomData<fn() -> I>,
}

impl<'h, C: InterruptController, I: IrqControl> InterruptSystem<'h, C, I> {
    /// Wrap `controller`. Nothing is touched until [`Self::initialize`].
    pub fn new(controller: C) -> Self {
        const {
            assert!(
                C::LINES as usize <= MAX_IRQ_LINES,
                "controller has more lines than the handler table"
            )
        };

        Self {
            controller,
            handlers: HandlerTable::new(),
            fiq: None,
            initialized: false,
            _cpu: PhantomData,
        }
    }

    /// Clear every handler, mask every source at the controller, then unmask
    /// IRQs at the CPU. Later calls do nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        self.initialize_masked();
        I::enable();
    }

    /// [`Self::initialize`] without touching the CPU mask. For callers that
    /// set up under an IRQ-safe lock and unmask once it is released.
    pub fn initialize_masked(&mut self) {
        if self.initialized {
            return;
        }

        self.handlers.clear();
        self.fiq = None;
        self.controller.disable_all();

        self.initialized = true;
        debug!("interrupt system up, {} lines", C::LINES);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Number of lines that currently have a handler.
    pub fn registered_handlers(&self) -> usize {
        self.handlers.registered()
    }

    fn check_line(irq: IrqNumber) -> Result<(), InterruptError> {
        if irq < C::LINES {
            Ok(())
        } else {
            Err(InterruptError::InvalidLine(irq))
        }
    }

    /// Install `handler` for `irq` and unmask the line.
    ///
    /// # Errors
    ///
    /// - [`InterruptError::InvalidLine`] if `irq` is not below `C::LINES`
    /// - [`InterruptError::AlreadyRegistered`] if the line has a handler; the
    ///   existing one stays in place
    /// - any error the controller reports when unmasking, in which case the
    ///   handler is not kept
    pub fn register_irq_handler(
        &mut self,
        irq: IrqNumber,
        handler: &'h dyn IrqHandler,
    ) -> Result<(), InterruptError> {
        Self::check_line(irq)?;
        self.handlers.insert(irq, handler)?;

        if let Err(err) = self.controller.enable(irq) {
            let _ = self.handlers.remove(irq);
            return Err(err);
        }

        trace!("IRQ {irq} handler registered");
        Ok(())
    }

    /// Mask `irq` and remove its handler.
    pub fn unregister_irq_handler(&mut self, irq: IrqNumber) -> Result<(), InterruptError> {
        Self::check_line(irq)?;
        if self.handlers.get(irq).is_none() {
            return Err(InterruptError::NotRegistered(irq));
        }

        self.controller.disable(irq)?;
        self.handlers.remove(irq)?;

        trace!("IRQ {irq} handler removed");
        Ok(())
    }

    /// Route FIQ `source` to `handler`.
    pub fn register_fiq_handler(
        &mut self,
        source: u32,
        handler: &'h dyn IrqHandler,
    ) -> Result<(), InterruptError> {
        if source > C::MAX_FIQ {
            return Err(InterruptError::InvalidFiqSource(source));
        }
        if self.fiq.is_some() {
            return Err(InterruptError::FiqAlreadyRegistered);
        }

        self.controller.enable_fiq(source)?;
        self.fiq = Some(FiqBinding { source, handler });

        trace!("FIQ source {source} registered");
        Ok(())
    }

    /// Disarm the FIQ and drop its handler.
    pub fn unregister_fiq_handler(&mut self) -> Result<(), InterruptError> {
        let binding = self.fiq.take().ok_or(InterruptError::FiqNotRegistered)?;
        self.controller.disable_fiq();

        trace!("FIQ source {} removed", binding.source);
        Ok(())
    }

    /// [`Self::register_irq_handler`], panicking on error.
    #[track_caller]
    pub fn attach_irq_handler(&mut self, irq: IrqNumber, handler: &'h dyn IrqHandler) {
        if let Err(err) = self.register_irq_handler(irq, handler) {
            panic!("attach_irq_handler: {err}");
        }
    }

    /// [`Self::unregister_irq_handler`], panicking on error.
    #[track_caller]
    pub fn detach_irq_handler(&mut self, irq: IrqNumber) {
        if let Err(err) = self.unregister_irq_handler(irq) {
            panic!("detach_irq_handler: {err}");
        }
    }

    /// [`Self::register_fiq_handler`], panicking on error.
    #[track_caller]
    pub fn attach_fiq_handler(&mut self, source: u32, handler: &'h dyn IrqHandler) {
        if let Err(err) = self.register_fiq_handler(source, handler) {
            panic!("attach_fiq_handler: {err}");
        }
    }

    /// [`Self::unregister_fiq_handler`], panicking on error.
    #[track_caller]
    pub fn detach_fiq_handler(&mut self) {
        if let Err(err) = self.unregister_fiq_handler() {
            panic!("detach_fiq_handler: {err}");
        }
    }

    /// Service every pending line once.
    ///
    /// Lines are visited in the order the controller reports its pending
    /// words, lowest bit first within a word. A pending line without a
    /// handler is masked so it cannot storm. Returns the number of handlers
    /// invoked.
    pub fn dispatch_irq(&mut self) -> usize {
        let pending = self.controller.pending();
        let mut handled = 0;

        for irq in pending.lines() {
            match self.handlers.get(irq) {
                Some(handler) => {
                    handler.handle(irq);
                    handled += 1;
                }
                None => {
                    warn!("IRQ {irq} pending without handler, masking");
                    if let Err(err) = self.controller.disable(irq) {
                        warn!("cannot mask IRQ {irq}: {err}");
                    }
                }
            }
        }

        handled
    }

    /// Invoke the FIQ handler, if one is registered.
    pub fn dispatch_fiq(&self) {
        if let Some(binding) = self.fiq {
            binding.handler.handle(binding.source);
        }
    }
}

impl<C: InterruptController, I: IrqControl> Drop for InterruptSystem<'_, C, I> {
    fn drop(&mut self) {
        self.controller.disable_all();
        let _ = I::disable();
    }
}
