use core::fmt::{Display, Formatter};
use std::error;
use std::io;

use crate::pdu::check::{CheckError, CommandLengthError};
use crate::pdu::formats::OctetStringCreationError;
use crate::pdu::PduStatus;

/// What was wrong with a PDU.  The header values it was found in are kept
/// on the surrounding `PduParseError`.
#[derive(Debug)]
pub enum PduParseErrorBody {
    CommandLength(CommandLengthError),
    /// Every field was parsed but command_length covers more octets.
    TrailingOctets(u32),
    /// A length field inside the body disagrees with its data.
    IncorrectLength(u32, String),
    InvalidSequenceNumber,
    /// command_status is not one this command may carry.
    UnexpectedStatus,
    /// A response carries a body with an error status, or none with ROK.
    BodyDoesNotMatchStatus,
    NotEnoughBytes,
    OctetString(OctetStringCreationError),
    Io(io::Error),
    UnknownCommandId,
}

impl PduParseErrorBody {
    fn nack_status(&self) -> PduStatus {
        match self {
            PduParseErrorBody::CommandLength(_)
            | PduParseErrorBody::TrailingOctets(_) => {
                PduStatus::ESME_RINVCMDLEN
            }
            PduParseErrorBody::IncorrectLength(_, _) => {
                PduStatus::ESME_RINVMSGLEN
            }
            PduParseErrorBody::UnknownCommandId => PduStatus::ESME_RINVCMDID,
            _ => PduStatus::ESME_RSYSERR,
        }
    }
}

impl Display for PduParseErrorBody {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            PduParseErrorBody::CommandLength(e) => Display::fmt(e, formatter),
            PduParseErrorBody::TrailingOctets(length) => write!(
                formatter,
                "All fields parsed but command_length ({}) is longer.",
                length
            ),
            PduParseErrorBody::IncorrectLength(length, message) => write!(
                formatter,
                "Length {} was incorrect: {}",
                length, message
            ),
            PduParseErrorBody::InvalidSequenceNumber => formatter.write_str(
                "sequence_number must be 0x00000001 to 0x7FFFFFFF.",
            ),
            PduParseErrorBody::UnexpectedStatus => formatter
                .write_str("command_status is not allowed for this command."),
            PduParseErrorBody::BodyDoesNotMatchStatus => formatter.write_str(
                "A body must be present exactly when command_status is 0.",
            ),
            PduParseErrorBody::NotEnoughBytes => formatter.write_str(
                "Input ended before all fields of the PDU were read.",
            ),
            PduParseErrorBody::OctetString(e) => Display::fmt(e, formatter),
            PduParseErrorBody::Io(e) => write!(formatter, "IO error: {}", e),
            PduParseErrorBody::UnknownCommandId => {
                formatter.write_str("Supplied command_id is unknown.")
            }
        }
    }
}

#[derive(Debug)]
pub struct PduParseError {
    pub command_id: Option<u32>,
    command_status: Option<u32>,
    pub sequence_number: Option<u32>,
    field_name: Option<String>,
    body: PduParseErrorBody,
}

impl PduParseError {
    pub fn new(body: PduParseErrorBody) -> Self {
        Self {
            command_id: None,
            command_status: None,
            sequence_number: None,
            field_name: None,
            body,
        }
    }

    pub fn into_with_header(
        mut self,
        command_id: Option<u32>,
        command_status: Option<u32>,
        sequence_number: Option<u32>,
    ) -> Self {
        self.command_id = command_id;
        self.command_status = command_status;
        self.sequence_number = sequence_number;
        self
    }

    pub fn into_with_field_name(mut self, field_name: &str) -> Self {
        self.field_name = Some(String::from(field_name));
        self
    }

    pub fn body(&self) -> &PduParseErrorBody {
        &self.body
    }

    /// The command_status to answer with in a generic_nack.
    pub fn status(&self) -> u32 {
        self.body.nack_status() as u32
    }
}

impl From<OctetStringCreationError> for PduParseError {
    fn from(e: OctetStringCreationError) -> Self {
        Self::new(PduParseErrorBody::OctetString(e))
    }
}

impl From<CheckError> for PduParseError {
    fn from(e: CheckError) -> Self {
        match e {
            CheckError::IoError(e) => e.into(),
            CheckError::CommandLengthError(e) => e.into(),
        }
    }
}

impl From<CommandLengthError> for PduParseError {
    fn from(e: CommandLengthError) -> Self {
        Self::new(PduParseErrorBody::CommandLength(e))
    }
}

impl From<io::Error> for PduParseError {
    fn from(e: io::Error) -> Self {
        Self::new(match e.kind() {
            io::ErrorKind::UnexpectedEof => PduParseErrorBody::NotEnoughBytes,
            _ => PduParseErrorBody::Io(e),
        })
    }
}

impl Display for PduParseError {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "Bad PDU (command_id={}, command_status={}, sequence_number={}",
            as_hex(self.command_id),
            as_hex(self.command_status),
            as_hex(self.sequence_number),
        )?;
        if let Some(field_name) = &self.field_name {
            write!(formatter, ", field {}", field_name)?;
        }
        write!(formatter, "): {}", self.body)
    }
}

impl error::Error for PduParseError {}

fn as_hex(num: Option<u32>) -> String {
    match num {
        Some(num) => format!("{:#010X}", num),
        None => String::from("?"),
    }
}

/// Tag the error, if any, with the field it came from.
pub fn fld<T, E>(
    field_name: &str,
    res: Result<T, E>,
) -> Result<T, PduParseError>
where
    E: Into<PduParseError>,
{
    res.map_err(|e| e.into().into_with_field_name(field_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_values_prefix_the_message() {
        assert_eq!(
            PduParseError::new(PduParseErrorBody::UnknownCommandId)
                .into_with_header(
                    Some(0x00000103),
                    Some(0x00000000),
                    Some(0x00000002)
                )
                .to_string(),
            "Bad PDU (command_id=0x00000103, command_status=0x00000000, \
            sequence_number=0x00000002): Supplied command_id is unknown."
        );
    }

    #[test]
    fn field_name_is_reported() {
        let err: Result<(), PduParseError> = fld(
            "short_message",
            Err(OctetStringCreationError::TooLong(254)),
        );
        let msg = err.unwrap_err().to_string();
        assert!(msg.starts_with("Bad PDU (command_id=?"), "{}", msg);
        assert!(msg.contains(", field short_message): "), "{}", msg);
    }

    #[test]
    fn nack_status_follows_the_kind_of_error() {
        let status =
            |body: PduParseErrorBody| PduParseError::new(body).status();
        assert_eq!(status(PduParseErrorBody::UnknownCommandId), 0x00000003);
        assert_eq!(
            status(PduParseErrorBody::CommandLength(
                CommandLengthError::TooShort(4)
            )),
            0x00000002
        );
        assert_eq!(status(PduParseErrorBody::TrailingOctets(20)), 0x00000002);
        assert_eq!(
            status(PduParseErrorBody::IncorrectLength(3, String::new())),
            0x00000001
        );
        assert_eq!(status(PduParseErrorBody::UnexpectedStatus), 0x00000008);
    }
}
