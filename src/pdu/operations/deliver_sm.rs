use regex::Regex;
use std::io;
use std::str;

use crate::pdu::data::sm_data::{Address, SmData};
use crate::pdu::esm_class::DeliverEsmClass;
use crate::pdu::formats::{COctetString, WriteStream};
use crate::pdu::pduparseerror::fld;
use crate::pdu::tlvs::{KnownTlvTag, Tlvs};
use crate::pdu::PduParseError;

const MAX_LENGTH_MESSAGE_ID: usize = 65;

#[derive(Debug, PartialEq)]
pub struct DeliverSmPdu(SmData);

impl DeliverSmPdu {
    pub fn new(
        source: Address,
        destination: Address,
        esm_class: u8,
        data_coding: u8,
        short_message: &[u8],
        tlvs: Tlvs,
    ) -> Result<Self, PduParseError> {
        Ok(Self(SmData::new(
            source,
            destination,
            esm_class,
            0,
            data_coding,
            short_message,
            tlvs,
        )?))
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        self.0.write(stream).await
    }

    pub fn parse(
        bytes: &mut dyn io::BufRead,
        command_status: u32,
    ) -> Result<DeliverSmPdu, PduParseError> {
        Ok(Self(SmData::parse(bytes, command_status)?))
    }

    pub fn validate_command_status(
        self,
        command_status: u32,
    ) -> Result<Self, PduParseError> {
        Ok(Self(self.0.validate_command_status(command_status)?))
    }

    pub fn esm_class(&self) -> DeliverEsmClass {
        DeliverEsmClass(self.0.esm_class())
    }

    pub fn data_coding(&self) -> u8 {
        self.0.data_coding()
    }

    pub fn user_data(&self) -> &[u8] {
        self.0.user_data()
    }

    pub fn tlvs(&self) -> &Tlvs {
        self.0.tlvs()
    }

    pub fn source_addr(&self) -> String {
        self.0.source.addr.to_string()
    }

    /// The SMSC's id for the message a delivery receipt refers to, from
    /// the receipted_message_id TLV or the "id:" field of the receipt text.
    pub fn extract_receipted_message_id(&self) -> Option<String> {
        if let Some(tlv) = self.0.tlvs().get(KnownTlvTag::receipted_message_id)
        {
            return String::from_utf8(tlv.value.clone()).ok().map(|mut s| {
                if s.ends_with('\0') {
                    s.truncate(s.len() - 1)
                }
                s
            });
        }

        lazy_static! {
            static ref RE: Regex =
                Regex::new(r"(?i)\bid:(\S*)(\s|$)").expect("valid regex");
        }

        str::from_utf8(self.0.short_message()).ok().and_then(|sm| {
            RE.captures(sm)
                .and_then(|caps| caps.get(1))
                .map(|id| String::from(id.as_str()))
        })
    }
}

/// deliver_sm_resp carries an unused message_id, always empty.
#[derive(Debug, PartialEq)]
pub struct DeliverSmRespPdu {
    message_id: COctetString,
}

impl DeliverSmRespPdu {
    pub fn new() -> Self {
        Self {
            message_id: COctetString {
                value: ascii::AsciiString::new(),
            },
        }
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        self.message_id.write(stream).await
    }

    pub fn parse(
        bytes: &mut dyn io::BufRead,
        _command_status: u32,
    ) -> Result<Self, PduParseError> {
        let message_id = fld(
            "message_id",
            COctetString::read(bytes, MAX_LENGTH_MESSAGE_ID),
        )?;
        Ok(Self { message_id })
    }

    pub fn validate_command_status(
        self,
        _command_status: u32,
    ) -> Result<Self, PduParseError> {
        Ok(self)
    }
}

impl Default for DeliverSmRespPdu {
    fn default() -> Self {
        Self::new()
    }
}
