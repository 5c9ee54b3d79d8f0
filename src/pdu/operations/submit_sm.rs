use std::io;

use crate::pdu::data::sm_data::{Address, SmData};
use crate::pdu::formats::WriteStream;
use crate::pdu::tlvs::Tlvs;
use crate::pdu::PduParseError;

#[derive(Debug, PartialEq)]
pub struct SubmitSmPdu(SmData);

impl SubmitSmPdu {
    pub fn new(
        source: Address,
        destination: Address,
        esm_class: u8,
        registered_delivery: u8,
        data_coding: u8,
        short_message: &[u8],
        tlvs: Tlvs,
    ) -> Result<Self, PduParseError> {
        Ok(Self(SmData::new(
            source,
            destination,
            esm_class,
            registered_delivery,
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
    ) -> Result<SubmitSmPdu, PduParseError> {
        Ok(Self(SmData::parse(bytes, command_status)?))
    }

    pub fn validate_command_status(
        self,
        command_status: u32,
    ) -> Result<Self, PduParseError> {
        Ok(Self(self.0.validate_command_status(command_status)?))
    }

    pub fn destination_addr(&self) -> String {
        self.0.destination.addr.to_string()
    }

    pub fn esm_class(&self) -> u8 {
        self.0.esm_class()
    }

    pub fn data_coding(&self) -> u8 {
        self.0.data_coding()
    }

    pub fn user_data(&self) -> &[u8] {
        self.0.user_data()
    }
}
