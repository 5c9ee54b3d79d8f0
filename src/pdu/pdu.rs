use std::io;
use std::io::Read;
use tokio::io::AsyncWriteExt;

use crate::pdu::check::validate_command_length;
use crate::pdu::formats::{Integer4, WriteStream};
use crate::pdu::{
    check, BindTransceiverPdu, BindTransceiverRespPdu, CheckError,
    CheckOutcome, DeliverSmPdu, DeliverSmRespPdu, EnquireLinkPdu,
    EnquireLinkRespPdu, GenericNackPdu, PduParseError, PduParseErrorBody,
    SubmitSmPdu, SubmitSmRespPdu, UnbindPdu, UnbindRespPdu,
};

#[derive(Debug, PartialEq)]
pub enum PduBody {
    BindTransceiver(BindTransceiverPdu),
    BindTransceiverResp(BindTransceiverRespPdu),
    DeliverSm(DeliverSmPdu),
    DeliverSmResp(DeliverSmRespPdu),
    EnquireLink(EnquireLinkPdu),
    EnquireLinkResp(EnquireLinkRespPdu),
    GenericNack(GenericNackPdu),
    SubmitSm(SubmitSmPdu),
    SubmitSmResp(SubmitSmRespPdu),
    Unbind(UnbindPdu),
    UnbindResp(UnbindRespPdu),
}

impl PduBody {
    fn validate_command_status(
        self,
        command_status: u32,
    ) -> Result<Self, PduParseError> {
        self.do_validate_command_status(command_status)
            .map_err(|e| e.into_with_field_name("command_status"))
    }

    fn do_validate_command_status(
        self,
        command_status: u32,
    ) -> Result<Self, PduParseError> {
        Ok(match self {
            PduBody::BindTransceiver(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::BindTransceiverResp(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::DeliverSm(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::DeliverSmResp(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::EnquireLink(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::EnquireLinkResp(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::GenericNack(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::SubmitSm(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::SubmitSmResp(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::Unbind(b) => {
                b.validate_command_status(command_status)?.into()
            }
            PduBody::UnbindResp(b) => {
                b.validate_command_status(command_status)?.into()
            }
        })
    }
}

impl From<BindTransceiverPdu> for PduBody {
    fn from(body: BindTransceiverPdu) -> PduBody {
        PduBody::BindTransceiver(body)
    }
}

impl From<BindTransceiverRespPdu> for PduBody {
    fn from(body: BindTransceiverRespPdu) -> PduBody {
        PduBody::BindTransceiverResp(body)
    }
}

impl From<DeliverSmPdu> for PduBody {
    fn from(body: DeliverSmPdu) -> PduBody {
        PduBody::DeliverSm(body)
    }
}

impl From<DeliverSmRespPdu> for PduBody {
    fn from(body: DeliverSmRespPdu) -> PduBody {
        PduBody::DeliverSmResp(body)
    }
}

impl From<EnquireLinkPdu> for PduBody {
    fn from(body: EnquireLinkPdu) -> PduBody {
        PduBody::EnquireLink(body)
    }
}

impl From<EnquireLinkRespPdu> for PduBody {
    fn from(body: EnquireLinkRespPdu) -> PduBody {
        PduBody::EnquireLinkResp(body)
    }
}

impl From<GenericNackPdu> for PduBody {
    fn from(body: GenericNackPdu) -> PduBody {
        PduBody::GenericNack(body)
    }
}

impl From<SubmitSmPdu> for PduBody {
    fn from(body: SubmitSmPdu) -> PduBody {
        PduBody::SubmitSm(body)
    }
}

impl From<SubmitSmRespPdu> for PduBody {
    fn from(body: SubmitSmRespPdu) -> PduBody {
        PduBody::SubmitSmResp(body)
    }
}

impl From<UnbindPdu> for PduBody {
    fn from(body: UnbindPdu) -> PduBody {
        PduBody::Unbind(body)
    }
}

impl From<UnbindRespPdu> for PduBody {
    fn from(body: UnbindRespPdu) -> PduBody {
        PduBody::UnbindResp(body)
    }
}

#[derive(Debug, PartialEq)]
pub struct Pdu {
    pub command_status: Integer4,
    pub sequence_number: Integer4,
    body: PduBody,
}

impl Pdu {
    pub fn new(
        command_status: u32,
        sequence_number: u32,
        body: PduBody,
    ) -> Result<Self, PduParseError> {
        validate_sequence_number(sequence_number)?;
        Ok(Self {
            command_status: Integer4::new(command_status),
            sequence_number: Integer4::new(sequence_number),
            body: body.validate_command_status(command_status)?,
        })
    }

    pub fn parse(bytes: &mut dyn io::BufRead) -> Result<Pdu, PduParseError> {
        let command_length = Integer4::read(bytes)?;
        let mut bytes = bytes.take(
            u64::try_from(command_length.value.saturating_sub(4)).unwrap_or(0),
        );

        let command_id = hfld("command_id", &mut bytes, &command_length)?;
        let command_status =
            hfld("command_status", &mut bytes, &command_length).map_err(
                |e| e.into_with_header(Some(command_id.value), None, None),
            )?;
        let sequence_number =
            hfld("sequence_number", &mut bytes, &command_length).map_err(
                |e| {
                    e.into_with_header(
                        Some(command_id.value),
                        Some(command_status.value),
                        None,
                    )
                },
            )?;

        validate_command_length(&command_length).map_err(|e| {
            PduParseError::from(e).into_with_header(
                Some(command_id.value),
                Some(command_status.value),
                Some(sequence_number.value),
            )
        })?;

        validate_sequence_number(sequence_number.value).map_err(|e| {
            e.into_with_header(
                Some(command_id.value),
                Some(command_status.value),
                Some(sequence_number.value),
            )
        })?;

        let status = command_status.value;

        let body =
            parse_body(&mut bytes, command_id.value, command_status.value)
                .and_then(|ret| {
                    // There should be no bytes left over
                    let mut buf = [0; 1];
                    if bytes.read(&mut buf)? == 0 {
                        Ok(ret.validate_command_status(status)?)
                    } else {
                        Err(PduParseError::new(
                            PduParseErrorBody::TrailingOctets(
                                command_length.value,
                            ),
                        ))
                    }
                })
                .map_err(|e| {
                    e.into_with_header(
                        Some(command_id.value),
                        Some(command_status.value),
                        Some(sequence_number.value),
                    )
                })?;

        Ok(Pdu {
            command_status,
            sequence_number,
            body,
        })
    }

    pub fn check(
        bytes: &mut dyn io::BufRead,
    ) -> Result<CheckOutcome, CheckError> {
        check::check(bytes)
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        let mut buf = Vec::new();
        self.command_id().write(&mut buf).await?;
        self.command_status.write(&mut buf).await?;
        self.sequence_number.write(&mut buf).await?;
        match &self.body {
            PduBody::BindTransceiver(body) => body.write(&mut buf).await?,
            PduBody::BindTransceiverResp(body) => body.write(&mut buf).await?,
            PduBody::DeliverSm(body) => body.write(&mut buf).await?,
            PduBody::DeliverSmResp(body) => body.write(&mut buf).await?,
            PduBody::EnquireLink(body) => body.write(&mut buf).await?,
            PduBody::EnquireLinkResp(body) => body.write(&mut buf).await?,
            PduBody::GenericNack(body) => body.write(&mut buf).await?,
            PduBody::SubmitSm(body) => body.write(&mut buf).await?,
            PduBody::SubmitSmResp(body) => body.write(&mut buf).await?,
            PduBody::Unbind(body) => body.write(&mut buf).await?,
            PduBody::UnbindResp(body) => body.write(&mut buf).await?,
        }
        let command_length = Integer4::new((buf.len() + 4) as u32);
        command_length.write(stream).await?;
        stream.write_all(&buf).await?;
        stream.flush().await
    }

    pub fn command_id(&self) -> Integer4 {
        Integer4::new(match self.body {
            PduBody::SubmitSm(_) => 0x00000004,
            PduBody::SubmitSmResp(_) => 0x80000004,
            PduBody::DeliverSm(_) => 0x00000005,
            PduBody::DeliverSmResp(_) => 0x80000005,
            PduBody::Unbind(_) => 0x00000006,
            PduBody::UnbindResp(_) => 0x80000006,
            PduBody::BindTransceiver(_) => 0x00000009,
            PduBody::BindTransceiverResp(_) => 0x80000009,
            PduBody::EnquireLink(_) => 0x00000015,
            PduBody::EnquireLinkResp(_) => 0x80000015,
            PduBody::GenericNack(_) => 0x80000000,
        })
    }

    pub fn body(&self) -> &PduBody {
        &self.body
    }

    pub fn into_body(self) -> PduBody {
        self.body
    }
}

pub fn parse_body(
    bytes: &mut dyn io::BufRead,
    command_id: u32,
    command_status: u32,
) -> Result<PduBody, PduParseError> {
    match command_id {
        0x00000004 => {
            SubmitSmPdu::parse(bytes, command_status).map(|p| p.into())
        }
        0x80000004 => {
            SubmitSmRespPdu::parse(bytes, command_status).map(|p| p.into())
        }
        0x00000005 => {
            DeliverSmPdu::parse(bytes, command_status).map(|p| p.into())
        }
        0x80000005 => {
            DeliverSmRespPdu::parse(bytes, command_status).map(|p| p.into())
        }
        0x00000006 => UnbindPdu::parse(bytes, command_status).map(|p| p.into()),
        0x80000006 => {
            UnbindRespPdu::parse(bytes, command_status).map(|p| p.into())
        }
        0x00000009 => {
            BindTransceiverPdu::parse(bytes, command_status).map(|p| p.into())
        }
        0x80000009 => BindTransceiverRespPdu::parse(bytes, command_status)
            .map(|p| p.into()),
        0x00000015 => {
            EnquireLinkPdu::parse(bytes, command_status).map(|p| p.into())
        }
        0x80000015 => {
            EnquireLinkRespPdu::parse(bytes, command_status).map(|p| p.into())
        }
        0x80000000 => {
            GenericNackPdu::parse(bytes, command_status).map(|p| p.into())
        }
        _ => Err(PduParseError::new(PduParseErrorBody::UnknownCommandId)),
    }
}

fn hfld(
    field_name: &str,
    mut bytes: &mut dyn io::BufRead,
    command_length: &Integer4,
) -> Result<Integer4, PduParseError> {
    Integer4::read(&mut bytes).map_err(|e| {
        if let Err(len_e) = validate_command_length(command_length) {
            PduParseError::from(len_e)
        } else {
            PduParseError::from(e).into_with_field_name(field_name)
        }
    })
}

fn validate_sequence_number(sequence_number: u32) -> Result<(), PduParseError> {
    if !(0x00000001..=0x7fffffff).contains(&sequence_number) {
        Err(PduParseError::new(PduParseErrorBody::InvalidSequenceNumber))
    } else {
        Ok(())
    }
}
