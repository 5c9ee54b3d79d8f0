use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::codec::{OutboundCodec, Reassembler, Reassembly};
use crate::config::GatewayConfig;
use crate::datagram::DatagramChannel;
use crate::error::{GatewayError, TransportError};
use crate::framing::hex_preview;
use crate::sms::{SmsSegment, SmsTransport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatewayState {
    Waiting,
    Dispatching,
}

/// Moves datagrams from the UDP side to SMS and reassembled segments from
/// SMS back to UDP.  Everything runs on the task that calls `run`.
pub struct Gateway<T: SmsTransport> {
    channel: DatagramChannel,
    transport: T,
    codec: OutboundCodec,
    reassembler: Reassembler,
    state: GatewayState,
    buf: Vec<u8>,
    sweep_period: Duration,
}

impl<T: SmsTransport> Gateway<T> {
    pub fn new(
        channel: DatagramChannel,
        transport: T,
        config: &GatewayConfig,
    ) -> Self {
        let max_datagram_len = config.framing.max_datagram_len;
        let reassembler = Reassembler::new(
            max_datagram_len,
            config.reassembly.max_pending_sets,
            config.reassembly.timeout(),
        );
        // tokio intervals panic on a zero period.
        let sweep_period =
            (reassembler.timeout() / 4).max(Duration::from_millis(1));
        Self {
            channel,
            transport,
            codec: OutboundCodec::new(
                &config.sms.destination_number,
                config.framing.ports(),
                max_datagram_len,
            ),
            reassembler,
            state: GatewayState::Waiting,
            // One spare byte so an oversized datagram shows up as one.
            buf: vec![0; max_datagram_len + 1],
            sweep_period,
        }
    }

    pub fn state(&self) -> GatewayState {
        self.state
    }

    /// One receive, encode and send cycle, entered when the datagram
    /// channel is readable.  Returns the bytes handed to the SMS transport;
    /// failures are logged and the gateway goes back to waiting either way.
    pub async fn dispatch(&mut self) -> Option<usize> {
        self.state = GatewayState::Dispatching;
        let result = self.forward_datagram().await;
        self.state = GatewayState::Waiting;

        match result {
            Ok(sent) => sent,
            Err(e) => {
                tracing::warn!("datagram not sent as SMS: {}", e);
                None
            }
        }
    }

    async fn forward_datagram(
        &mut self,
    ) -> Result<Option<usize>, GatewayError> {
        let len = match self.channel.receive(&mut self.buf)? {
            Some(len) => len,
            None => return Ok(None),
        };
        let sent = self
            .codec
            .encode_and_send(&self.buf[..len], &self.transport)
            .await?;
        tracing::debug!("datagram of {} bytes sent as SMS", len);
        Ok(Some(sent))
    }

    /// Feed one inbound segment to the reassembler and forward the datagram
    /// if it completed one.  Returns the bytes sent over UDP.
    pub async fn on_segment_delivered(
        &mut self,
        segment: SmsSegment,
    ) -> Option<usize> {
        let sender = segment.sender.clone();
        match self.reassembler.accept(segment, Instant::now()) {
            Ok(Reassembly::Complete(datagram)) => {
                match self.channel.send(&datagram).await {
                    Ok(sent) => {
                        tracing::debug!(
                            "forwarded {} bytes from {}: {}",
                            sent,
                            sender,
                            hex_preview(&datagram, 16)
                        );
                        Some(sent)
                    }
                    Err(e) => {
                        tracing::warn!(
                            "could not forward datagram from {}: {}",
                            sender,
                            e
                        );
                        None
                    }
                }
            }
            Ok(Reassembly::Pending) => None,
            Ok(Reassembly::StatusReport) => {
                tracing::debug!("status report from {}", sender);
                None
            }
            Err(e) => {
                tracing::warn!("dropped segment from {}: {}", sender, e);
                None
            }
        }
    }

    /// Runs until the SMS transport goes away, which is reported as
    /// `TransportError::Closed`.
    pub async fn run(
        mut self,
        mut segments: mpsc::Receiver<SmsSegment>,
    ) -> Result<(), GatewayError> {
        let mut sweep = tokio::time::interval(self.sweep_period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("gateway running");
        loop {
            tokio::select! {
                readable = self.channel.wait_readable() => {
                    readable?;
                    self.dispatch().await;
                }
                segment = segments.recv() => match segment {
                    Some(segment) => {
                        self.on_segment_delivered(segment).await;
                    }
                    None => {
                        tracing::info!("SMS transport closed, stopping");
                        self.channel.close();
                        return Err(TransportError::Closed.into());
                    }
                },
                _ = sweep.tick() => {
                    let expired = self.reassembler.expire(Instant::now());
                    if expired > 0 {
                        tracing::info!(
                            "discarded {} incomplete message(s)",
                            expired
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::WAP_PUSH_HEADER;
    use crate::sms::Concatenation;
    use crate::unittest_utils::{RecordingTransport, SentMessage};
    use tokio::net::UdpSocket;

    const D: [u8; 10] = [0xAA; 10];

    async fn gateway(
        config: &GatewayConfig,
        transport: RecordingTransport,
    ) -> (Gateway<RecordingTransport>, UdpSocket) {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let channel = DatagramChannel::bind_connected(
            "127.0.0.1:0",
            server.local_addr().unwrap(),
        )
        .await
        .unwrap();
        server.connect(channel.local_addr().unwrap()).await.unwrap();
        (Gateway::new(channel, transport, config), server)
    }

    fn with_header(data: &[u8]) -> Vec<u8> {
        let mut out = WAP_PUSH_HEADER.to_vec();
        out.extend_from_slice(data);
        out
    }

    async fn recv_from_gateway(server: &UdpSocket) -> Vec<u8> {
        let mut buf = [0; 2048];
        let len = tokio::time::timeout(
            Duration::from_secs(5),
            server.recv(&mut buf),
        )
        .await
        .unwrap()
        .unwrap();
        buf[..len].to_vec()
    }

    #[tokio::test]
    async fn readable_datagram_is_sent_as_sms() {
        let transport = RecordingTransport::new();
        let (mut gateway, server) =
            gateway(&GatewayConfig::default(), transport.clone()).await;
        server.send(&D).await.unwrap();

        let sent = loop {
            gateway.channel.wait_readable().await.unwrap();
            if let Some(sent) = gateway.dispatch().await {
                break sent;
            }
        };

        assert_eq!(sent, 16);
        assert_eq!(gateway.state(), GatewayState::Waiting);
        assert_eq!(
            transport.sent(),
            vec![SentMessage {
                destination: String::from("580011600030"),
                payload: with_header(&D),
                header_descriptor: String::from("0605040B8423F0"),
            }]
        );
    }

    #[tokio::test]
    async fn oversized_datagram_is_dropped() {
        let mut config = GatewayConfig::default();
        config.framing.max_datagram_len = 8;
        let transport = RecordingTransport::new();
        let (mut gateway, server) = gateway(&config, transport.clone()).await;
        server.send(&[1; 9]).await.unwrap();

        gateway.channel.wait_readable().await.unwrap();
        assert_eq!(gateway.dispatch().await, None);
        assert_eq!(gateway.state(), GatewayState::Waiting);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_returns_to_waiting() {
        let (mut gateway, server) =
            gateway(&GatewayConfig::default(), RecordingTransport::failing())
                .await;
        server.send(&D).await.unwrap();

        gateway.channel.wait_readable().await.unwrap();
        assert_eq!(gateway.dispatch().await, None);
        assert_eq!(gateway.state(), GatewayState::Waiting);
    }

    #[tokio::test]
    async fn single_segment_is_forwarded_over_udp() {
        let (mut gateway, server) =
            gateway(&GatewayConfig::default(), RecordingTransport::new())
                .await;

        let forwarded = gateway
            .on_segment_delivered(SmsSegment::deliver("1", &with_header(&D)))
            .await;

        assert_eq!(forwarded, Some(10));
        assert_eq!(recv_from_gateway(&server).await, D.to_vec());
    }

    #[tokio::test]
    async fn concatenated_segments_are_forwarded_once_complete() {
        let (mut gateway, server) =
            gateway(&GatewayConfig::default(), RecordingTransport::new())
                .await;
        let first = SmsSegment::concatenated(
            "1",
            Concatenation::new(Some(3), 1, 2),
            &with_header(&D[..5]),
        );
        let second = SmsSegment::concatenated(
            "1",
            Concatenation::new(Some(3), 2, 2),
            &D[5..],
        );

        assert_eq!(gateway.on_segment_delivered(first).await, None);
        assert_eq!(gateway.reassembler.accumulated_length(), 11);
        assert_eq!(gateway.on_segment_delivered(second).await, Some(10));
        assert_eq!(gateway.reassembler.accumulated_length(), 0);
        assert_eq!(recv_from_gateway(&server).await, D.to_vec());
    }

    #[tokio::test]
    async fn failed_forward_leaves_nothing_buffered() {
        let mut config = GatewayConfig::default();
        config.framing.max_datagram_len = 65522;
        let (mut gateway, server) =
            gateway(&config, RecordingTransport::new()).await;
        // Reassembles within capacity but is too big for one IPv4 datagram.
        let first = SmsSegment::concatenated(
            "1",
            Concatenation::new(Some(9), 1, 2),
            &with_header(&[0x11; 40000]),
        );
        let second = SmsSegment::concatenated(
            "1",
            Concatenation::new(Some(9), 2, 2),
            &[0x22; 25520],
        );

        assert_eq!(gateway.on_segment_delivered(first).await, None);
        assert_eq!(gateway.on_segment_delivered(second).await, None);
        assert_eq!(gateway.reassembler.accumulated_length(), 0);
        assert_eq!(gateway.reassembler.pending_sets(), 0);

        let first = SmsSegment::concatenated(
            "1",
            Concatenation::new(Some(9), 1, 2),
            &with_header(&D[..5]),
        );
        let second = SmsSegment::concatenated(
            "1",
            Concatenation::new(Some(9), 2, 2),
            &D[5..],
        );
        assert_eq!(gateway.on_segment_delivered(first).await, None);
        assert_eq!(gateway.reassembler.accumulated_length(), 11);
        assert_eq!(gateway.on_segment_delivered(second).await, Some(10));
        assert_eq!(recv_from_gateway(&server).await, D.to_vec());
    }

    #[tokio::test]
    async fn status_report_forwards_nothing() {
        let (mut gateway, _server) =
            gateway(&GatewayConfig::default(), RecordingTransport::new())
                .await;
        assert_eq!(
            gateway
                .on_segment_delivered(SmsSegment::status_report("1"))
                .await,
            None
        );
        assert_eq!(gateway.reassembler.pending_sets(), 0);
    }

    #[tokio::test]
    async fn run_stops_when_the_segment_source_closes() {
        let (gateway, server) =
            gateway(&GatewayConfig::default(), RecordingTransport::new())
                .await;
        let (tx, rx) = mpsc::channel(4);
        tx.send(SmsSegment::deliver("1", &with_header(&D)))
            .await
            .unwrap();
        drop(tx);

        let result = gateway.run(rx).await;

        assert!(matches!(
            result,
            Err(GatewayError::Transport(TransportError::Closed))
        ));
        assert_eq!(recv_from_gateway(&server).await, D.to_vec());
    }

    #[tokio::test]
    async fn run_sends_datagrams_as_sms() {
        let transport = RecordingTransport::new();
        let (gateway, server) =
            gateway(&GatewayConfig::default(), transport.clone()).await;
        let (_tx, rx) = mpsc::channel(4);
        server.send(&[7, 8, 9]).await.unwrap();

        let sent = async {
            loop {
                let sent = transport.sent();
                if !sent.is_empty() {
                    return sent;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        let sent = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::select! {
                result = gateway.run(rx) => {
                    panic!("gateway stopped: {:?}", result)
                }
                sent = sent => sent,
            }
        })
        .await
        .unwrap();

        assert_eq!(sent[0].payload, with_header(&[7, 8, 9]));
    }
}
