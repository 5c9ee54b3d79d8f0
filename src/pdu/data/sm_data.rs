use std::io;

use crate::pdu::formats::{COctetString, Integer1, OctetString, WriteStream};
use crate::pdu::pduparseerror::fld;
use crate::pdu::tlvs::{KnownTlvTag, Tlvs};
use crate::pdu::{PduParseError, PduParseErrorBody};

const MAX_LENGTH_SERVICE_TYPE: usize = 6;
const MAX_LENGTH_ADDR: usize = 21;
const MAX_LENGTH_SCHEDULE_DELIVERY_TIME: usize = 17;
const MAX_LENGTH_VALIDITY_PERIOD: usize = 17;
pub const MAX_LENGTH_SHORT_MESSAGE: usize = 254;

/// Type of number + numbering plan + digits, as used for source_addr and
/// destination_addr.
#[derive(Clone, Debug, PartialEq)]
pub struct Address {
    pub ton: Integer1,
    pub npi: Integer1,
    pub addr: COctetString,
}

impl Address {
    pub fn new(ton: u8, npi: u8, addr: &str) -> Result<Self, PduParseError> {
        Ok(Self {
            ton: Integer1::new(ton),
            npi: Integer1::new(npi),
            addr: COctetString::from_str(addr, MAX_LENGTH_ADDR)?,
        })
    }

    /// International number, ISDN (E.164) plan.
    pub fn international(addr: &str) -> Result<Self, PduParseError> {
        Self::new(0x01, 0x01, addr)
    }

    /// Unknown type of number, unknown plan.
    pub fn unknown(addr: &str) -> Result<Self, PduParseError> {
        Self::new(0x00, 0x00, addr)
    }

    async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        self.ton.write(stream).await?;
        self.npi.write(stream).await?;
        self.addr.write(stream).await
    }

    fn read(
        bytes: &mut dyn io::BufRead,
        prefix: &str,
    ) -> Result<Self, PduParseError> {
        let ton = fld(&format!("{}_ton", prefix), Integer1::read(bytes))?;
        let npi = fld(&format!("{}_npi", prefix), Integer1::read(bytes))?;
        let addr = fld(
            &format!("{}_addr", prefix),
            COctetString::read(bytes, MAX_LENGTH_ADDR),
        )?;
        Ok(Self { ton, npi, addr })
    }
}

/// The body shared by submit_sm and deliver_sm.
#[derive(Debug, PartialEq)]
pub struct SmData {
    service_type: COctetString,
    pub source: Address,
    pub destination: Address,
    esm_class: Integer1,
    protocol_id: Integer1,
    priority_flag: Integer1,
    schedule_delivery_time: COctetString,
    validity_period: COctetString,
    registered_delivery: Integer1,
    replace_if_present_flag: Integer1,
    data_coding: Integer1,
    sm_default_msg_id: Integer1,
    short_message: OctetString,
    tlvs: Tlvs,
}

impl SmData {
    /// Immediate delivery, default validity, no replace.  Either
    /// short_message or a message_payload TLV carries the user data.
    pub fn new(
        source: Address,
        destination: Address,
        esm_class: u8,
        registered_delivery: u8,
        data_coding: u8,
        short_message: &[u8],
        tlvs: Tlvs,
    ) -> Result<Self, PduParseError> {
        if short_message.len() > MAX_LENGTH_SHORT_MESSAGE {
            return Err(PduParseError::new(
                PduParseErrorBody::IncorrectLength(
                    short_message.len() as u32,
                    String::from("short_message must be less than 255 bytes."),
                ),
            )
            .into_with_field_name("short_message"));
        }
        if !short_message.is_empty()
            && tlvs.get(KnownTlvTag::message_payload).is_some()
        {
            return Err(PduParseError::new(
                PduParseErrorBody::IncorrectLength(
                    short_message.len() as u32,
                    String::from(
                        "short_message must be empty when message_payload \
                        is supplied.",
                    ),
                ),
            )
            .into_with_field_name("short_message"));
        }

        Ok(Self {
            service_type: COctetString::from_str("", MAX_LENGTH_SERVICE_TYPE)?,
            source,
            destination,
            esm_class: Integer1::new(esm_class),
            protocol_id: Integer1::new(0),
            priority_flag: Integer1::new(0),
            schedule_delivery_time: COctetString::from_str(
                "",
                MAX_LENGTH_SCHEDULE_DELIVERY_TIME,
            )?,
            validity_period: COctetString::from_str(
                "",
                MAX_LENGTH_VALIDITY_PERIOD,
            )?,
            registered_delivery: Integer1::new(registered_delivery),
            replace_if_present_flag: Integer1::new(0),
            data_coding: Integer1::new(data_coding),
            sm_default_msg_id: Integer1::new(0),
            short_message: fld(
                "short_message",
                OctetString::from_bytes(
                    short_message,
                    MAX_LENGTH_SHORT_MESSAGE,
                ),
            )?,
            tlvs,
        })
    }

    pub async fn write(&self, stream: &mut WriteStream) -> io::Result<()> {
        self.service_type.write(stream).await?;
        self.source.write(stream).await?;
        self.destination.write(stream).await?;
        self.esm_class.write(stream).await?;
        self.protocol_id.write(stream).await?;
        self.priority_flag.write(stream).await?;
        self.schedule_delivery_time.write(stream).await?;
        self.validity_period.write(stream).await?;
        self.registered_delivery.write(stream).await?;
        self.replace_if_present_flag.write(stream).await?;
        self.data_coding.write(stream).await?;
        self.sm_default_msg_id.write(stream).await?;
        // Bounded by MAX_LENGTH_SHORT_MESSAGE on construction
        Integer1::new(self.short_message.len() as u8)
            .write(stream)
            .await?;
        self.short_message.write(stream).await?;
        self.tlvs.write(stream).await
    }

    pub fn parse(
        bytes: &mut dyn io::BufRead,
        _command_status: u32,
    ) -> Result<Self, PduParseError> {
        let service_type = fld(
            "service_type",
            COctetString::read(bytes, MAX_LENGTH_SERVICE_TYPE),
        )?;
        let source = Address::read(bytes, "source_addr")?;
        let destination = Address::read(bytes, "dest_addr")?;
        let esm_class = fld("esm_class", Integer1::read(bytes))?;
        let protocol_id = fld("protocol_id", Integer1::read(bytes))?;
        let priority_flag = fld("priority_flag", Integer1::read(bytes))?;
        let schedule_delivery_time = fld(
            "schedule_delivery_time",
            COctetString::read(bytes, MAX_LENGTH_SCHEDULE_DELIVERY_TIME),
        )?;
        let validity_period = fld(
            "validity_period",
            COctetString::read(bytes, MAX_LENGTH_VALIDITY_PERIOD),
        )?;
        let registered_delivery =
            fld("registered_delivery", Integer1::read(bytes))?;
        let replace_if_present_flag =
            fld("replace_if_present_flag", Integer1::read(bytes))?;
        let data_coding = fld("data_coding", Integer1::read(bytes))?;
        let sm_default_msg_id =
            fld("sm_default_msg_id", Integer1::read(bytes))?;
        let sm_length = fld("sm_length", Integer1::read(bytes))?;
        let short_message = fld(
            "short_message",
            OctetString::read(
                bytes,
                sm_length.value as usize,
                MAX_LENGTH_SHORT_MESSAGE,
            ),
        )?;
        let tlvs = fld("tlvs", Tlvs::read(bytes))?;

        validate_length_1_or_17(
            "schedule_delivery_time",
            schedule_delivery_time.len(),
        )?;
        validate_length_1_or_17("validity_period", validity_period.len())?;

        Ok(Self {
            service_type,
            source,
            destination,
            esm_class,
            protocol_id,
            priority_flag,
            schedule_delivery_time,
            validity_period,
            registered_delivery,
            replace_if_present_flag,
            data_coding,
            sm_default_msg_id,
            short_message,
            tlvs,
        })
    }

    pub fn validate_command_status(
        self,
        command_status: u32,
    ) -> Result<Self, PduParseError> {
        if command_status == 0x00000000 {
            Ok(self)
        } else {
            Err(PduParseError::new(PduParseErrorBody::UnexpectedStatus))
        }
    }

    pub fn esm_class(&self) -> u8 {
        self.esm_class.value
    }

    pub fn data_coding(&self) -> u8 {
        self.data_coding.value
    }

    pub fn short_message(&self) -> &[u8] {
        &self.short_message.value
    }

    pub fn tlvs(&self) -> &Tlvs {
        &self.tlvs
    }

    /// The user data: short_message, or the message_payload TLV when
    /// short_message is empty.
    pub fn user_data(&self) -> &[u8] {
        if self.short_message.is_empty() {
            if let Some(tlv) = self.tlvs.get(KnownTlvTag::message_payload) {
                return &tlv.value;
            }
        }
        &self.short_message.value
    }
}

fn validate_length_1_or_17(
    field_name: &str,
    length: usize,
) -> Result<(), PduParseError> {
    // We have already removed the trailing NULL character, so we actually
    // check for length 0 or 16.
    if length == 0 || length == 16 {
        Ok(())
    } else {
        Err(PduParseError::new(PduParseErrorBody::IncorrectLength(
            length as u32,
            String::from(
                "Must be either 1 or 17 characters, including \
                the NULL character.",
            ),
        ))
        .into_with_field_name(field_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::tlvs::Tlv;

    fn addresses() -> (Address, Address) {
        (
            Address::unknown("").unwrap(),
            Address::international("580011600030").unwrap(),
        )
    }

    #[test]
    fn short_message_longer_than_254_is_rejected() {
        let (source, destination) = addresses();
        let err = SmData::new(
            source,
            destination,
            0x40,
            0,
            0x04,
            &[0u8; 255],
            Tlvs::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("short_message"));
    }

    #[test]
    fn short_message_and_message_payload_together_are_rejected() {
        let (source, destination) = addresses();
        let tlvs = Tlvs::from(&[Tlv::new(KnownTlvTag::message_payload, &[1])]);
        assert!(
            SmData::new(source, destination, 0x40, 0, 0x04, &[1], tlvs)
                .is_err()
        );
    }

    #[test]
    fn user_data_falls_back_to_message_payload() {
        let (source, destination) = addresses();
        let tlvs =
            Tlvs::from(&[Tlv::new(KnownTlvTag::message_payload, &[7, 8, 9])]);
        let data =
            SmData::new(source, destination, 0x40, 0, 0x04, &[], tlvs).unwrap();
        assert_eq!(data.user_data(), &[7, 8, 9]);
        assert!(data.short_message().is_empty());
    }

    #[tokio::test]
    async fn written_body_parses_back() {
        let (source, destination) = addresses();
        let data = SmData::new(
            source,
            destination,
            0x40,
            0,
            0x04,
            &[0x06, 0x05, 0x04, 0x0b, 0x84, 0x23, 0xf0, 0xaa],
            Tlvs::new(),
        )
        .unwrap();

        let mut buf: Vec<u8> = Vec::new();
        data.write(&mut buf).await.unwrap();
        let parsed =
            SmData::parse(&mut io::BufReader::new(&buf[..]), 0).unwrap();

        assert_eq!(parsed, data);
        assert_eq!(parsed.destination.addr.to_string(), "580011600030");
        assert_eq!(parsed.esm_class(), 0x40);
        assert_eq!(parsed.data_coding(), 0x04);
    }
}
