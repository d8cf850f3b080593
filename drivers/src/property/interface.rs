//! Property tag marshalling.
//!
//! A request travels in the coherent page as
//!
//! ```text
//! offset 0: total size (multiple of 4)
//! offset 4: code (request 0, success 0x8000_0000)
//! offset 8: tags ...
//!           end tag (0)
//! ```

use common::arch::{dmb, dsb};
use log::{debug, trace};

use super::PropertyError;
use super::tag::{
    MIN_TAG_SIZE, PropertyId, TAG_HEADER_SIZE, TAG_ID_OFFSET, TAG_RESPONSE_BIT,
    TAG_SIZE_OFFSET, TAG_STATUS_OFFSET, read_u32, write_u32,
};
use crate::hal::mailbox::Mailbox;
use crate::platform::bcm2837::memory::{COHERENT_PAGE_SIZE, CoherentPage};

const CODE_REQUEST: u32 = 0x0000_0000;
const CODE_RESPONSE_SUCCESS: u32 = 0x8000_0000;

const BUFFER_SIZE_OFFSET: usize = 0;
const BUFFER_CODE_OFFSET: usize = 4;
const BUFFER_TAGS_OFFSET: usize = 8;
const END_TAG_SIZE: usize = 4;

/// Sends property tags to the firmware over a property-channel mailbox.
pub struct PropertiesInterface<'p, B: Mailbox> {
    mailbox: B,
    page: &'p CoherentPage,
}

impl<'p, B: Mailbox> PropertiesInterface<'p, B> {
    /// `page` holds every request; it must be memory the GPU sees coherently.
    pub fn new(mailbox: B, page: &'p CoherentPage) -> Self {
        Self { mailbox, page }
    }

    /// Send one tag and check its status.
    ///
    /// `tag` is the whole tag: the header is filled in here, the payload is
    /// the caller's request and is replaced by the response. On success the
    /// status word holds the response length with the response bit cleared.
    pub fn get_tag(
        &mut self,
        tag_id: PropertyId,
        tag: &mut [u8],
    ) -> Result<(), PropertyError> {
        if tag.len() < MIN_TAG_SIZE {
            return Err(PropertyError::InvalidTagBuffer);
        }

        let payload_size = (tag.len() - TAG_HEADER_SIZE) as u32;
        write_u32(tag, TAG_ID_OFFSET, tag_id.into());
        write_u32(tag, TAG_SIZE_OFFSET, payload_size);
        write_u32(tag, TAG_STATUS_OFFSET, 0);

        trace!("property tag {tag_id:?} ({payload_size} byte payload)");
        self.get_tags(tag)?;

        let status = read_u32(tag, TAG_STATUS_OFFSET);
        if status & TAG_RESPONSE_BIT == 0 {
            debug!("property tag {tag_id:?} not processed, status {status:#010x}");
            return Err(PropertyError::TagNotProcessed);
        }

        let status = status & !TAG_RESPONSE_BIT;
        write_u32(tag, TAG_STATUS_OFFSET, status);
        if status == 0 {
            debug!("property tag {tag_id:?} rejected");
            return Err(PropertyError::TagRejected);
        }

        Ok(())
    }

    /// Send a pre-built sequence of tags (without the end tag).
    ///
    /// `tags` must hold at least one tag. It is left untouched unless the
    /// firmware reports success, in which case it receives the response.
    pub fn get_tags(&mut self, tags: &mut [u8]) -> Result<(), PropertyError> {
        if tags.len() < MIN_TAG_SIZE {
            return Err(PropertyError::InvalidTagBuffer);
        }

        let tags_end = BUFFER_TAGS_OFFSET + tags.len();
        let total = tags_end + END_TAG_SIZE;
        if total % 4 != 0 {
            return Err(PropertyError::SizeNotAligned);
        }
        if total > COHERENT_PAGE_SIZE {
            return Err(PropertyError::TooLarge);
        }

        let mut claim = self.page.claim().ok_or(PropertyError::Busy)?;
        {
            let buffer = claim.bytes_mut();
            write_u32(buffer, BUFFER_SIZE_OFFSET, total as u32);
            write_u32(buffer, BUFFER_CODE_OFFSET, CODE_REQUEST);
            buffer[BUFFER_TAGS_OFFSET..tags_end].copy_from_slice(tags);
            write_u32(buffer, tags_end, PropertyId::End.into());
        }

        // Request must reach memory before the doorbell
        dsb();

        let address = claim.bus_address();
        let reply = self.mailbox.write_read(address)?;
        if reply != address {
            debug!("property reply for {reply:#010x}, expected {address:#010x}");
            return Err(PropertyError::AddressMismatch);
        }

        dmb();

        let buffer = claim.bytes();
        let code = read_u32(buffer, BUFFER_CODE_OFFSET);
        if code != CODE_RESPONSE_SUCCESS {
            debug!("property request failed, code {code:#010x}");
            return Err(PropertyError::RequestFailed(code));
        }

        tags.copy_from_slice(&buffer[BUFFER_TAGS_OFFSET..tags_end]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mailbox::MailboxError;
    use crate::testing::FakeFirmware;

    fn serial_tag() -> [u8; 20] {
        [0u8; 20]
    }

    #[test]
    fn serial_round_trip() {
        let page = CoherentPage::new();
        let mut firmware =
            FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 8, &[0x1234_5678, 0x9ABC_DEF0]);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        let mut tag = serial_tag();
        interface.get_tag(PropertyId::GetBoardSerial, &mut tag).unwrap();

        assert_eq!(read_u32(&tag, 8), 8);
        let serial = (u64::from(read_u32(&tag, 16)) << 32) | u64::from(read_u32(&tag, 12));
        assert_eq!(serial, 0x9ABC_DEF0_1234_5678);

        let request = &firmware.requests()[0];
        assert_eq!(read_u32(request, 0), 32);
        assert_eq!(read_u32(request, 4), 0);
        assert_eq!(read_u32(request, 8), 0x0001_0004);
        assert_eq!(read_u32(request, 12), 8);
        assert_eq!(read_u32(request, 16), 0);
        assert_eq!(read_u32(request, 28), 0);
        assert_eq!(firmware.addresses(), vec![page.bus_address()]);
    }

    #[test]
    fn response_bit_must_be_set() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, 8, &[1, 2]);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        assert_eq!(
            interface.get_tag(PropertyId::GetBoardSerial, &mut serial_tag()),
            Err(PropertyError::TagNotProcessed)
        );
    }

    #[test]
    fn empty_status_is_rejection() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT, &[1, 2]);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        assert_eq!(
            interface.get_tag(PropertyId::GetBoardSerial, &mut serial_tag()),
            Err(PropertyError::TagRejected)
        );
    }

    #[test]
    fn short_tag_buffer_is_refused() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 4, &[1]);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        assert_eq!(
            interface.get_tag(PropertyId::GetFirmwareRevision, &mut [0u8; 15]),
            Err(PropertyError::InvalidTagBuffer)
        );
        assert_eq!(firmware.calls(), 0);
    }

    #[test]
    fn short_tag_sequences_never_reach_the_mailbox() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 4, &[1]);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        assert_eq!(
            interface.get_tags(&mut []),
            Err(PropertyError::InvalidTagBuffer)
        );
        assert_eq!(
            interface.get_tags(&mut [0u8; 4]),
            Err(PropertyError::InvalidTagBuffer)
        );
        assert_eq!(firmware.calls(), 0);
    }

    #[test]
    fn unaligned_size_never_reaches_the_mailbox() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 4, &[1]);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        assert_eq!(
            interface.get_tags(&mut [0u8; 18]),
            Err(PropertyError::SizeNotAligned)
        );
        assert_eq!(firmware.calls(), 0);
    }

    #[test]
    fn oversized_request_is_refused() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 4, &[1]);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        let mut tags = [0u8; COHERENT_PAGE_SIZE];
        assert_eq!(interface.get_tags(&mut tags), Err(PropertyError::TooLarge));
        assert_eq!(firmware.calls(), 0);
    }

    #[test]
    fn address_mismatch_leaves_caller_buffer_alone() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 8, &[7, 7]);
        firmware.reply_with(0xC000_1000);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        let mut tag = [0xEE; 20];
        tag[..12].fill(0);
        let before = tag;
        assert_eq!(
            interface.get_tags(&mut tag),
            Err(PropertyError::AddressMismatch)
        );
        assert_eq!(tag, before);
    }

    #[test]
    fn failed_request_leaves_caller_buffer_alone() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 8, &[7, 7]);
        firmware.respond_with_code(0x8000_0001);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        let mut tag = [0x11; 20];
        let before = tag;
        assert_eq!(
            interface.get_tags(&mut tag),
            Err(PropertyError::RequestFailed(0x8000_0001))
        );
        assert_eq!(tag, before);
    }

    #[test]
    fn mailbox_errors_propagate() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 4, &[1]);
        firmware.fail_with(MailboxError::Timeout);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        assert_eq!(
            interface.get_tag(PropertyId::GetFirmwareRevision, &mut [0u8; 16]),
            Err(PropertyError::Mailbox(MailboxError::Timeout))
        );
    }

    #[test]
    fn claimed_page_reports_busy() {
        let page = CoherentPage::new();
        let mut firmware = FakeFirmware::answering(&page, TAG_RESPONSE_BIT | 4, &[1]);
        let mut interface = PropertiesInterface::new(&mut firmware, &page);

        let _held = page.claim().unwrap();
        assert_eq!(
            interface.get_tag(PropertyId::GetFirmwareRevision, &mut [0u8; 16]),
            Err(PropertyError::Busy)
        );
    }
}
