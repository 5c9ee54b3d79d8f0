#![cfg(test)]

use std::io;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::error::{GatewayError, TransportError};
use crate::sms::{SmsSegment, SmsTransport};

pub struct FailingRead {}

impl FailingRead {
    pub fn new_bufreader() -> io::BufReader<FailingRead> {
        io::BufReader::new(FailingRead {})
    }

    fn error() -> io::Error {
        io::Error::from_raw_os_error(22)
    }

    pub fn error_string() -> String {
        FailingRead::error().to_string()
    }
}

impl io::Read for FailingRead {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(FailingRead::error())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SentMessage {
    pub destination: String,
    pub payload: Vec<u8>,
    pub header_descriptor: String,
}

/// An SmsTransport that remembers what it was asked to send.  Clones share
/// the same record, so a test can keep one while the gateway owns another.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: bool,
    pub listener: Option<mpsc::Sender<SmsSegment>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails with TransportError::Closed.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl SmsTransport for RecordingTransport {
    fn register_segment_listener(
        &mut self,
        listener: mpsc::Sender<SmsSegment>,
    ) {
        self.listener = Some(listener);
    }

    async fn send(
        &self,
        destination: &str,
        payload: &[u8],
        header_descriptor: &str,
    ) -> Result<usize, GatewayError> {
        if self.failing {
            return Err(TransportError::Closed.into());
        }
        self.sent.lock().unwrap().push(SentMessage {
            destination: String::from(destination),
            payload: payload.to_vec(),
            header_descriptor: String::from(header_descriptor),
        });
        Ok(payload.len())
    }
}
