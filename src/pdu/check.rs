use core::fmt::{Display, Formatter};
use std::convert::TryFrom;
use std::io;

use crate::pdu::formats::Integer4;

// https://smpp.org/smppv34_gsmumts_ig_v10.pdf p11 states:
// "... message_payload parameter which can hold up to a maximum of 64K ..."
// So we guess no valid PDU can be longer than 70K octets.
pub const MAX_PDU_LENGTH: usize = 70000;

// We need at least a command_length and command_id, so 8 bytes
pub const MIN_PDU_LENGTH: usize = 8;

#[derive(Debug)]
pub enum CommandLengthError {
    TooLong(u32),
    TooShort(u32),
}

impl Display for CommandLengthError {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            CommandLengthError::TooLong(length) => write!(
                formatter,
                "command_length {} is over the maximum of {} octets.",
                length, MAX_PDU_LENGTH
            ),
            CommandLengthError::TooShort(length) => write!(
                formatter,
                "command_length {} is under the minimum of {} octets.",
                length, MIN_PDU_LENGTH
            ),
        }
    }
}

pub fn validate_command_length(
    command_length: &Integer4,
) -> Result<(), CommandLengthError> {
    let len = command_length.value;
    if len > MAX_PDU_LENGTH as u32 {
        Err(CommandLengthError::TooLong(len))
    } else if len < MIN_PDU_LENGTH as u32 {
        Err(CommandLengthError::TooShort(len))
    } else {
        Ok(())
    }
}

#[derive(Debug)]
pub enum CheckError {
    CommandLengthError(CommandLengthError),
    IoError(io::Error),
}

impl From<CommandLengthError> for CheckError {
    fn from(e: CommandLengthError) -> Self {
        CheckError::CommandLengthError(e)
    }
}

/// An UnexpectedEof converted through here must be remapped to
/// CheckOutcome::Incomplete by check() before reaching a caller.
impl From<io::Error> for CheckError {
    fn from(e: io::Error) -> Self {
        CheckError::IoError(e)
    }
}

#[derive(Debug, PartialEq)]
pub enum CheckOutcome {
    /// A whole PDU of this many octets is available.
    Ready(usize),
    Incomplete,
}

/// Decide whether `bytes` starts with a complete PDU, without parsing it.
/// Used by the SMPP reader to frame PDUs out of the TCP byte stream.
pub fn check(bytes: &mut dyn io::BufRead) -> Result<CheckOutcome, CheckError> {
    match check_can_read(bytes) {
        Err(CheckError::IoError(e)) => match e.kind() {
            io::ErrorKind::UnexpectedEof => Ok(CheckOutcome::Incomplete),
            _ => Err(CheckError::IoError(e)),
        },
        Ok(len) => Ok(CheckOutcome::Ready(len)),
        Err(e) => Err(e),
    }
}

fn check_can_read(bytes: &mut dyn io::BufRead) -> Result<usize, CheckError> {
    let command_length = Integer4::read(bytes)?;
    validate_command_length(&command_length)?;

    let len = usize::try_from(command_length.value).map_err(|_| {
        CheckError::CommandLengthError(CommandLengthError::TooLong(
            command_length.value,
        ))
    })?;
    let mut rest = vec![0; len - 4];
    bytes.read_exact(rest.as_mut_slice())?;
    Ok(len)
}
