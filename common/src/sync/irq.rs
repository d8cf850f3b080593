use core::fmt::Debug;

/// Architecture-specific interrupt masking interface.
///
/// Implemented by [`crate::arch`] for the running CPU; tests provide their
/// own recording implementations.
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Mask IRQs and return the previous state.
    fn disable() -> Self::State;

    /// Restore IRQs to a previous state.
    fn restore(state: Self::State);

    /// Unmask IRQs unconditionally.
    fn enable();
}
