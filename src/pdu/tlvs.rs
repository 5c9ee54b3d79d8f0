use num_traits::{FromPrimitive, ToPrimitive};
use std::io;
use std::io::BufRead;
use tokio::io::AsyncWriteExt;

use crate::pdu::formats::WriteStream;

/// Optional parameters the gateway reads or writes.  Any other tag is
/// kept as an unknown TLV and passed over.
#[repr(u16)]
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, FromPrimitive, ToPrimitive)]
pub enum KnownTlvTag {
    receipted_message_id = 0x001E,
    user_message_reference = 0x0204,
    source_port = 0x020A,
    destination_port = 0x020B,
    sar_msg_ref_num = 0x020C,
    sar_total_segments = 0x020E,
    sar_segment_seqnum = 0x020F,
    SC_interface_version = 0x0210,
    message_payload = 0x0424,
    message_state = 0x0427,
}

impl KnownTlvTag {
    /// Returns None if this tag is not known.
    pub fn new(tag: u16) -> Option<Self> {
        FromPrimitive::from_u16(tag)
    }

    fn raw(&self) -> u16 {
        // repr(u16) so this cannot fail
        ToPrimitive::to_u16(self).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tlv {
    pub raw_tag: u16,
    pub value: Vec<u8>,
}

impl Tlv {
    pub fn new(tag: KnownTlvTag, value: &[u8]) -> Self {
        Self {
            raw_tag: tag.raw(),
            value: Vec::from(value),
        }
    }

    pub fn new_unknown(raw_tag: u16, value: &[u8]) -> Self {
        Self {
            raw_tag,
            value: Vec::from(value),
        }
    }

    /// Read the next TLV.  An empty reader gives Ok(None).
    pub fn read(bytes: &mut dyn BufRead) -> io::Result<Option<Self>> {
        let mut tag_bytes = [0u8; 2];
        if bytes.read(&mut tag_bytes[0..1])? == 0 {
            return Ok(None);
        }
        bytes.read_exact(&mut tag_bytes[1..2])?;
        let raw_tag = u16::from_be_bytes(tag_bytes);

        let mut len_bytes = [0u8; 2];
        bytes.read_exact(&mut len_bytes)?;
        let length = usize::from(u16::from_be_bytes(len_bytes));

        let mut value = vec![0; length];
        bytes.read_exact(&mut value[..])?;

        Ok(Some(Self { raw_tag, value }))
    }

    pub fn tag(&self) -> Result<KnownTlvTag, u16> {
        KnownTlvTag::new(self.raw_tag).ok_or(self.raw_tag)
    }

    /// Value of a one or two octet integer TLV (sar_*, port TLVs).
    pub fn value_as_u16(&self) -> Option<u16> {
        match self.value.as_slice() {
            [b] => Some(u16::from(*b)),
            [hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        let length = u16::try_from(self.value.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "TLV 0x{:04x} value of {} octets does not fit its length \
                    field",
                    self.raw_tag,
                    self.value.len()
                ),
            )
        })?;
        stream.write_u16(self.raw_tag).await?;
        stream.write_u16(length).await?;
        stream.write_all(&self.value).await
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Tlvs {
    values: Vec<Tlv>,
}

impl Tlvs {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn from(tlvs: &[Tlv]) -> Self {
        Self {
            values: Vec::from(tlvs),
        }
    }

    pub fn push(&mut self, tlv: Tlv) {
        self.values.push(tlv);
    }

    pub fn read(bytes: &mut dyn BufRead) -> io::Result<Self> {
        let mut values = Vec::new();
        while let Some(tlv) = Tlv::read(bytes)? {
            values.push(tlv);
        }
        Ok(Self { values })
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        for tlv in &self.values {
            tlv.write(stream).await?;
        }
        Ok(())
    }

    pub fn get(&self, tag: KnownTlvTag) -> Option<&Tlv> {
        let raw = tag.raw();
        self.values.iter().find(|tlv| tlv.raw_tag == raw)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
