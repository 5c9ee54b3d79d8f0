use std::io;

use crate::pdu::formats::{COctetString, WriteStream};
use crate::pdu::pduparseerror::fld;
use crate::pdu::tlvs::Tlvs;
use crate::pdu::{PduParseError, PduParseErrorBody};

const MAX_LENGTH_SYSTEM_ID: usize = 16;

/// Body of a *_resp to a bind.  Absent when command_status is non-zero.
#[derive(Debug, PartialEq)]
pub struct BindRespData {
    system_id: Option<COctetString>,
    tlvs: Tlvs,
}

impl BindRespData {
    pub fn new(system_id: &str) -> Result<Self, PduParseError> {
        Ok(Self {
            system_id: Some(fld(
                "system_id",
                COctetString::from_str(system_id, MAX_LENGTH_SYSTEM_ID),
            )?),
            tlvs: Tlvs::new(),
        })
    }

    pub fn new_error() -> Self {
        Self {
            system_id: None,
            tlvs: Tlvs::new(),
        }
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        if let Some(system_id) = &self.system_id {
            system_id.write(stream).await?;
            self.tlvs.write(stream).await?;
        }
        Ok(())
    }

    pub fn parse(
        bytes: &mut dyn io::BufRead,
        command_status: u32,
    ) -> Result<BindRespData, PduParseError> {
        if command_status != 0x00000000 {
            return Ok(Self::new_error());
        }

        let system_id = Some(fld(
            "system_id",
            COctetString::read(bytes, MAX_LENGTH_SYSTEM_ID),
        )?);
        // sc_interface_version may follow
        let tlvs = fld("sc_interface_version", Tlvs::read(bytes))?;
        Ok(Self { system_id, tlvs })
    }

    pub fn validate_command_status(
        self,
        command_status: u32,
    ) -> Result<Self, PduParseError> {
        if self.system_id.is_some() == (command_status == 0) {
            Ok(self)
        } else {
            Err(PduParseError::new(PduParseErrorBody::BodyDoesNotMatchStatus))
        }
    }

    pub fn system_id(&self) -> Option<String> {
        self.system_id.as_ref().map(COctetString::to_string)
    }
}
