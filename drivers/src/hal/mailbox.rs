//! Mailbox Hardware Abstraction Layer.
//!
//! A mailbox carries one 28-bit, 16-byte aligned bus address to the
//! VideoCore and hands back the address the firmware answers with.

use core::fmt;

/// Mailbox transport errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MailboxError {
    /// A status poll exceeded the configured bound.
    Timeout,
    /// Address has channel bits set; nothing was sent.
    Misaligned(u32),
}

impl fmt::Display for MailboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "mailbox did not respond in time"),
            Self::Misaligned(address) => {
                write!(f, "mailbox address {address:#010x} is not 16-byte aligned")
            }
        }
    }
}

/// Request/response transport bound to one channel.
pub trait Mailbox {
    /// Post `address` on the bound channel and wait for the reply.
    ///
    /// Returns the reply with the channel bits cleared. The reply is not
    /// compared with `address`; that is the caller's job.
    fn write_read(&mut self, address: u32) -> Result<u32, MailboxError>;
}

impl<B: Mailbox + ?Sized> Mailbox for &mut B {
    fn write_read(&mut self, address: u32) -> Result<u32, MailboxError> {
        (**self).write_read(address)
    }
}
