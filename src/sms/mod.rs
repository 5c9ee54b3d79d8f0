//! The short-message side of the gateway: what an inbound segment looks
//! like, and the transport that delivers segments and sends messages.

use std::future::Future;
use tokio::sync::mpsc;

use crate::error::GatewayError;

pub mod smpp;

pub use smpp::SmppTransport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Delivery receipt or intermediate notification for something we sent.
    StatusReport,
    Deliver,
    /// Any other message type, with its raw esm_class type bits.
    Other(u8),
}

/// Position of a segment within a concatenated message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Concatenation {
    /// None when the transport does not report a reference number.
    pub reference: Option<u16>,
    pub sequence_number: u8,
    pub total_segments: u8,
}

impl Concatenation {
    pub fn new(
        reference: Option<u16>,
        sequence_number: u8,
        total_segments: u8,
    ) -> Self {
        Self {
            reference,
            sequence_number,
            total_segments,
        }
    }
}

/// One inbound short message, with its UDH already taken off.
#[derive(Clone, Debug, PartialEq)]
pub struct SmsSegment {
    pub kind: SegmentKind,
    pub sender: String,
    pub concatenation: Option<Concatenation>,
    pub payload: Vec<u8>,
}

impl SmsSegment {
    pub fn deliver(sender: &str, payload: &[u8]) -> Self {
        Self {
            kind: SegmentKind::Deliver,
            sender: String::from(sender),
            concatenation: None,
            payload: payload.to_vec(),
        }
    }

    pub fn concatenated(
        sender: &str,
        concatenation: Concatenation,
        payload: &[u8],
    ) -> Self {
        Self {
            concatenation: Some(concatenation),
            ..Self::deliver(sender, payload)
        }
    }

    pub fn status_report(sender: &str) -> Self {
        Self {
            kind: SegmentKind::StatusReport,
            ..Self::deliver(sender, &[])
        }
    }
}

/// The boundary between the gateway and whatever carries short messages.
pub trait SmsTransport {
    /// Every inbound segment is pushed into `listener` from now on.
    fn register_segment_listener(
        &mut self,
        listener: mpsc::Sender<SmsSegment>,
    );

    /// Send `payload` to `destination` with the UDH given as a hex
    /// descriptor.  Returns the number of payload bytes handed over.
    fn send(
        &self,
        destination: &str,
        payload: &[u8],
        header_descriptor: &str,
    ) -> impl Future<Output = Result<usize, GatewayError>> + Send;
}
