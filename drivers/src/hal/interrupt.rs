//! Interrupt Controller Hardware Abstraction Layer.
//!
//! This module defines platform-independent traits for interrupt management.

use core::fmt;

/// Interrupt number type.
pub type IrqNumber = u32;

/// Upper bound on the number of pending-status words a controller reports.
pub const MAX_PENDING_WORDS: usize = 4;

/// One pending-status register: bit `n` set means line `base + n` is pending.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PendingWord {
    pub base: IrqNumber,
    pub bits: u32,
}

/// Snapshot of every pending-status word, in the order the controller wants
/// them serviced.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PendingIrqs {
    words: [PendingWord; MAX_PENDING_WORDS],
    len: usize,
}

impl PendingIrqs {
    pub const fn new() -> Self {
        Self {
            words: [PendingWord { base: 0, bits: 0 }; MAX_PENDING_WORDS],
            len: 0,
        }
    }

    /// Append a word. Words past [`MAX_PENDING_WORDS`] are dropped.
    pub fn push(&mut self, base: IrqNumber, bits: u32) {
        debug_assert!(self.len < MAX_PENDING_WORDS, "too many pending words");
        if let Some(slot) = self.words.get_mut(self.len) {
            *slot = PendingWord { base, bits };
            self.len += 1;
        }
    }

    pub fn words(&self) -> &[PendingWord] {
        &self.words[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.words().iter().all(|word| word.bits == 0)
    }

    /// Pending lines, word by word, ascending bit order within a word.
    pub fn lines(&self) -> impl Iterator<Item = IrqNumber> + '_ {
        self.words().iter().flat_map(|word| {
            (0..u32::BITS)
                .filter(move |bit| word.bits & (1 << bit) != 0)
                .map(move |bit| word.base + bit)
        })
    }
}

/// Interrupt registration and controller errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InterruptError {
    /// Line number is not below the controller's line count.
    InvalidLine(IrqNumber),
    /// Line exists but this controller cannot route it.
    UnsupportedLine(IrqNumber),
    /// A handler is already registered for the line.
    AlreadyRegistered(IrqNumber),
    /// No handler is registered for the line.
    NotRegistered(IrqNumber),
    /// FIQ source id above the controller's maximum.
    InvalidFiqSource(u32),
    /// The single FIQ slot is already taken.
    FiqAlreadyRegistered,
    /// No FIQ handler is registered.
    FiqNotRegistered,
}

impl fmt::Display for InterruptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLine(irq) => write!(f, "IRQ line {irq} out of range"),
            Self::UnsupportedLine(irq) => write!(f, "IRQ line {irq} not supported"),
            Self::AlreadyRegistered(irq) => {
                write!(f, "IRQ line {irq} already has a handler")
            }
            Self::NotRegistered(irq) => write!(f, "IRQ line {irq} has no handler"),
            Self::InvalidFiqSource(id) => write!(f, "FIQ source {id} out of range"),
            Self::FiqAlreadyRegistered => write!(f, "FIQ handler already registered"),
            Self::FiqNotRegistered => write!(f, "no FIQ handler registered"),
        }
    }
}

/// Interrupt controller trait.
///
/// This trait represents the system's interrupt controller: line masking,
/// the pending-status registers and the single FIQ source selector.
pub trait InterruptController {
    /// Number of IRQ lines, numbered `0..LINES`.
    const LINES: IrqNumber;

    /// Highest valid FIQ source id.
    const MAX_FIQ: u32;

    /// Enable (unmask) an interrupt line.
    fn enable(&mut self, irq: IrqNumber) -> Result<(), InterruptError>;

    /// Disable (mask) an interrupt line.
    fn disable(&mut self, irq: IrqNumber) -> Result<(), InterruptError>;

    /// Mask every line and disarm the FIQ.
    fn disable_all(&mut self);

    /// Read the pending-status registers.
    fn pending(&self) -> PendingIrqs;

    /// Route `source` to the FIQ.
    fn enable_fiq(&mut self, source: u32) -> Result<(), InterruptError>;

    /// Stop routing any source to the FIQ.
    fn disable_fiq(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_word_order_then_bit_order() {
        let mut pending = PendingIrqs::new();
        pending.push(73, 0);
        pending.push(0, (1 << 31) | (1 << 3) | 1);
        pending.push(32, 1 << 25);
        pending.push(64, 1 << 1);

        let lines: Vec<_> = pending.lines().collect();
        assert_eq!(lines, vec![0, 3, 31, 57, 65]);
        assert!(!pending.is_empty());
    }

    #[test]
    fn empty_words_are_empty() {
        let mut pending = PendingIrqs::new();
        pending.push(0, 0);
        assert!(pending.is_empty());
        assert_eq!(pending.lines().count(), 0);
    }
}
