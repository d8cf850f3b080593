//! VideoCore property channel.
//!
//! - [`tag`]: tag layout, tag and clock identifiers
//! - [`interface`]: marshals tags through the coherent page and the mailbox
//! - [`properties`]: typed requests built on the interface

pub mod interface;
pub mod properties;
pub mod tag;

use core::fmt;

use crate::hal::mailbox::MailboxError;

pub use interface::PropertiesInterface;
pub use properties::{MemoryRegion, RpiProperties};
pub use tag::{ClockId, PropertyId};

/// Property request errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// Tag buffer shorter than a header plus one word.
    InvalidTagBuffer,
    /// Request size is not a multiple of 4.
    SizeNotAligned,
    /// Request does not fit the coherent page.
    TooLarge,
    /// The coherent page is in use by another request.
    Busy,
    /// Mailbox transport failure.
    Mailbox(MailboxError),
    /// The firmware answered with a different buffer address.
    AddressMismatch,
    /// The firmware did not report success; carries the response code.
    RequestFailed(u32),
    /// The firmware did not mark the tag as processed.
    TagNotProcessed,
    /// The tag was processed but reported no result.
    TagRejected,
}

impl From<MailboxError> for PropertyError {
    fn from(err: MailboxError) -> Self {
        PropertyError::Mailbox(err)
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTagBuffer => write!(f, "tag buffer too small"),
            Self::SizeNotAligned => write!(f, "request size not a multiple of 4"),
            Self::TooLarge => write!(f, "request larger than the coherent page"),
            Self::Busy => write!(f, "property buffer busy"),
            Self::Mailbox(err) => write!(f, "mailbox: {err}"),
            Self::AddressMismatch => write!(f, "firmware answered for another buffer"),
            Self::RequestFailed(code) => write!(f, "firmware response code {code:#010x}"),
            Self::TagNotProcessed => write!(f, "tag not processed by firmware"),
            Self::TagRejected => write!(f, "tag rejected by firmware"),
        }
    }
}
