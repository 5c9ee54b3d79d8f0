use core::fmt::{Display, Formatter};
use std::error;
use std::io;

use crate::pdu::{PduParseError, PduStatus};
use crate::sms::SegmentKind;

/// Everything that can go wrong while moving one datagram or one segment
/// through the gateway.  None of these stop the gateway loop.
#[derive(Debug)]
pub enum GatewayError {
    Transport(TransportError),
    UnrecognizedSegment(SegmentKind),
    MalformedInput(MalformedInput),
}

#[derive(Debug)]
pub enum TransportError {
    Io(io::Error),
    /// The SMSC answered with a non-zero command_status.
    Status(u32),
    Pdu(PduParseError),
    InvalidDescriptor(String),
    Closed,
}

#[derive(Debug, PartialEq)]
pub enum MalformedInput {
    DatagramTooLarge { length: usize, max: usize },
    TooShort(usize),
    InvalidSequence { sequence_number: u8, total_segments: u8 },
    UnexpectedSequence { expected: u8, actual: u8 },
    TotalMismatch { expected: u8, actual: u8 },
    NoOpenSet(u8),
    CapacityExceeded { length: usize, capacity: usize },
    InvalidUdh(&'static str),
}

impl Display for GatewayError {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            GatewayError::Transport(e) => {
                write!(formatter, "Transport failed: {}", e)
            }
            GatewayError::UnrecognizedSegment(kind) => {
                write!(formatter, "Unrecognized SMS segment kind {:?}.", kind)
            }
            GatewayError::MalformedInput(e) => {
                write!(formatter, "Malformed input: {}", e)
            }
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            TransportError::Io(e) => write!(formatter, "IO error: {}", e),
            TransportError::Status(status) => write!(
                formatter,
                "SMSC returned command_status {}.",
                PduStatus::describe(*status)
            ),
            TransportError::Pdu(e) => write!(formatter, "{}", e),
            TransportError::InvalidDescriptor(descriptor) => write!(
                formatter,
                "UDH descriptor '{}' is not an even-length hex string.",
                descriptor
            ),
            TransportError::Closed => {
                formatter.write_str("SMPP session is closed.")
            }
        }
    }
}

impl Display for MalformedInput {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            MalformedInput::DatagramTooLarge { length, max } => write!(
                formatter,
                "Datagram of {} bytes is longer than the maximum of {}.",
                length, max
            ),
            MalformedInput::TooShort(length) => write!(
                formatter,
                "Payload of {} bytes is shorter than the WAP Push header.",
                length
            ),
            MalformedInput::InvalidSequence {
                sequence_number,
                total_segments,
            } => write!(
                formatter,
                "Segment {} of {} is out of range.",
                sequence_number, total_segments
            ),
            MalformedInput::UnexpectedSequence { expected, actual } => write!(
                formatter,
                "Expected segment {} but received segment {}.",
                expected, actual
            ),
            MalformedInput::TotalMismatch { expected, actual } => write!(
                formatter,
                "Segment claims {} segments but the set was opened with {}.",
                actual, expected
            ),
            MalformedInput::NoOpenSet(sequence_number) => write!(
                formatter,
                "Segment {} arrived with no set open.",
                sequence_number
            ),
            MalformedInput::CapacityExceeded { length, capacity } => write!(
                formatter,
                "Reassembled length {} exceeds capacity {}.",
                length, capacity
            ),
            MalformedInput::InvalidUdh(reason) => {
                write!(formatter, "Invalid user data header: {}.", reason)
            }
        }
    }
}

impl error::Error for GatewayError {}

impl error::Error for TransportError {}

impl error::Error for MalformedInput {}

impl From<TransportError> for GatewayError {
    fn from(e: TransportError) -> Self {
        GatewayError::Transport(e)
    }
}

impl From<MalformedInput> for GatewayError {
    fn from(e: MalformedInput) -> Self {
        GatewayError::MalformedInput(e)
    }
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        TransportError::Io(e)
    }
}

impl From<PduParseError> for TransportError {
    fn from(e: PduParseError) -> Self {
        TransportError::Pdu(e)
    }
}

impl From<io::Error> for GatewayError {
    fn from(e: io::Error) -> Self {
        GatewayError::Transport(e.into())
    }
}

impl From<PduParseError> for GatewayError {
    fn from(e: PduParseError) -> Self {
        GatewayError::Transport(e.into())
    }
}
