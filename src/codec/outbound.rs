use crate::error::{GatewayError, MalformedInput};
use crate::framing::{hex_preview, wap_push, PortAddressing};
use crate::sms::SmsTransport;

/// Turns one datagram into one short message: WAP Push header in front,
/// port addressing UDH alongside.  Holds no state between datagrams.
pub struct OutboundCodec {
    destination: String,
    header_descriptor: String,
    max_datagram_len: usize,
}

impl OutboundCodec {
    pub fn new(
        destination: &str,
        ports: PortAddressing,
        max_datagram_len: usize,
    ) -> Self {
        Self {
            destination: String::from(destination),
            header_descriptor: ports.descriptor(),
            max_datagram_len,
        }
    }

    pub fn header_descriptor(&self) -> &str {
        &self.header_descriptor
    }

    /// Returns the number of bytes handed to the transport, which is the
    /// datagram length plus the WAP Push header.
    pub async fn encode_and_send<T: SmsTransport>(
        &self,
        datagram: &[u8],
        transport: &T,
    ) -> Result<usize, GatewayError> {
        if datagram.len() > self.max_datagram_len {
            return Err(MalformedInput::DatagramTooLarge {
                length: datagram.len(),
                max: self.max_datagram_len,
            }
            .into());
        }

        let payload = wap_push::prepend(datagram);
        tracing::debug!(
            "sending {} bytes to {}: {}",
            payload.len(),
            self.destination,
            hex_preview(&payload, 16)
        );
        transport
            .send(&self.destination, &payload, &self.header_descriptor)
            .await
    }
}
