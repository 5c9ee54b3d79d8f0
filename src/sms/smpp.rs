//! An SMPP v3.4 transceiver session with an SMSC, used as the gateway's
//! short-message transport.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::SmsConfig;
use crate::error::{GatewayError, MalformedInput, TransportError};
use crate::framing::{decode_descriptor, split_user_data};
use crate::pdu::formats::WriteStream;
use crate::pdu::tlvs::{KnownTlvTag, Tlv, Tlvs};
use crate::pdu::{
    Address, BindTransceiverPdu, CheckError, CheckOutcome, DeliverSmPdu,
    DeliverSmRespPdu, EnquireLinkPdu, EnquireLinkRespPdu, GenericNackPdu,
    Pdu, PduBody, PduParseError, PduStatus, SubmitEsmClass, SubmitSmPdu,
    UnbindPdu, UnbindRespPdu, MAX_LENGTH_SHORT_MESSAGE,
};
use crate::sms::{Concatenation, SegmentKind, SmsSegment, SmsTransport};

/// data_coding for 8-bit binary user data.
const DATA_CODING_8BIT: u8 = 0x04;

const READ_CHUNK_SIZE: usize = 4096;

type SharedWriter = Arc<Mutex<Box<WriteStream>>>;
type SharedListener = Arc<StdMutex<Option<mpsc::Sender<SmsSegment>>>>;

struct SequenceNumbers(AtomicU32);

impl SequenceNumbers {
    fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// 0x00000001 to 0x7FFFFFFF, then round again.
    fn next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed) % 0x7fffffff + 1
    }
}

/// Splits a byte stream into PDUs.
struct PduReader<R> {
    stream: R,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> PduReader<R> {
    fn new(stream: R) -> Self {
        Self {
            stream,
            buf: Vec::new(),
        }
    }

    /// Ok(None) at end of stream.  A PDU whose length is sane but whose
    /// body does not parse comes back as the inner error, and the session
    /// may carry on after it.
    async fn next_pdu(
        &mut self,
    ) -> Result<Option<Result<Pdu, PduParseError>>, TransportError> {
        loop {
            match Pdu::check(&mut Cursor::new(&self.buf[..])) {
                Ok(CheckOutcome::Ready(length)) => {
                    let parsed =
                        Pdu::parse(&mut Cursor::new(&self.buf[..length]));
                    self.buf.drain(..length);
                    return Ok(Some(parsed));
                }
                Ok(CheckOutcome::Incomplete) => {
                    let mut chunk = [0u8; READ_CHUNK_SIZE];
                    let n = self.stream.read(&mut chunk).await?;
                    if n == 0 {
                        return Ok(None);
                    }
                    self.buf.extend_from_slice(&chunk[..n]);
                }
                Err(CheckError::IoError(e)) => return Err(e.into()),
                Err(CheckError::CommandLengthError(e)) => {
                    // We can no longer find the start of the next PDU
                    return Err(PduParseError::from(e).into());
                }
            }
        }
    }
}

async fn write_pdu(
    writer: &SharedWriter,
    pdu: &Pdu,
) -> Result<(), TransportError> {
    let mut stream = writer.lock().await;
    pdu.write(&mut **stream).await?;
    Ok(())
}

pub struct SmppTransport {
    writer: SharedWriter,
    sequence: Arc<SequenceNumbers>,
    listener: SharedListener,
    closed: Arc<AtomicBool>,
    source: Address,
    keep_alive: JoinHandle<()>,
}

impl SmppTransport {
    /// Connect to the SMSC over TCP and bind as a transceiver.
    pub async fn connect(config: &SmsConfig) -> Result<Self, GatewayError> {
        let stream = TcpStream::connect(&config.smsc_addr).await?;
        tracing::info!("connected to SMSC at {}", config.smsc_addr);
        let (read, write) = stream.into_split();
        Self::bind(read, write, config).await
    }

    /// Bind as a transceiver over an already open stream, then start
    /// answering the SMSC in the background.
    pub async fn bind<R, W>(
        read: R,
        write: W,
        config: &SmsConfig,
    ) -> Result<Self, GatewayError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let writer: SharedWriter = Arc::new(Mutex::new(Box::new(write)));
        let sequence = Arc::new(SequenceNumbers::new());
        let mut reader = PduReader::new(read);

        let bind = Pdu::new(
            PduStatus::ESME_ROK as u32,
            sequence.next(),
            BindTransceiverPdu::new(
                &config.system_id,
                &config.password,
                &config.system_type,
            )?
            .into(),
        )?;
        write_pdu(&writer, &bind).await?;

        loop {
            let pdu = match reader.next_pdu().await? {
                Some(parsed) => parsed?,
                None => return Err(TransportError::Closed.into()),
            };
            let status = pdu.command_status.value;
            match pdu.body() {
                PduBody::BindTransceiverResp(resp) => {
                    if status != PduStatus::ESME_ROK as u32 {
                        tracing::error!(
                            "bind_transceiver as '{}' refused: {}",
                            config.system_id,
                            PduStatus::describe(status)
                        );
                        return Err(TransportError::Status(status).into());
                    }
                    tracing::info!(
                        "bound as transceiver to {}",
                        resp.system_id().unwrap_or_default()
                    );
                    break;
                }
                PduBody::GenericNack(_) => {
                    return Err(TransportError::Status(status).into());
                }
                _ => tracing::debug!(
                    "ignoring command_id {:#010X} while binding",
                    pdu.command_id().value
                ),
            }
        }

        let listener: SharedListener = Arc::new(StdMutex::new(None));
        let closed = Arc::new(AtomicBool::new(false));

        let session = Session {
            writer: writer.clone(),
            listener: listener.clone(),
            closed: closed.clone(),
        };
        tokio::spawn(session.run(reader));

        let keep_alive = tokio::spawn(send_enquire_links(
            writer.clone(),
            sequence.clone(),
            closed.clone(),
            config.enquire_link_interval(),
        ));

        Ok(Self {
            writer,
            sequence,
            listener,
            closed,
            source: Address::unknown("")?,
            keep_alive,
        })
    }

    /// Ask the SMSC to end the session.  The background reader stops once
    /// the SMSC answers.
    pub async fn unbind(&self) -> Result<(), GatewayError> {
        let pdu = Pdu::new(
            PduStatus::ESME_ROK as u32,
            self.sequence.next(),
            UnbindPdu::new().into(),
        )?;
        write_pdu(&self.writer, &pdu).await?;
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for SmppTransport {
    fn drop(&mut self) {
        self.keep_alive.abort();
    }
}

impl SmsTransport for SmppTransport {
    fn register_segment_listener(
        &mut self,
        listener: mpsc::Sender<SmsSegment>,
    ) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(listener);
    }

    async fn send(
        &self,
        destination: &str,
        payload: &[u8],
        header_descriptor: &str,
    ) -> Result<usize, GatewayError> {
        if self.is_closed() {
            return Err(TransportError::Closed.into());
        }

        let mut user_data = decode_descriptor(header_descriptor)?;
        // The TLV length field is all a long message has to describe it.
        let max = usize::from(u16::MAX).saturating_sub(user_data.len());
        if payload.len() > max {
            return Err(MalformedInput::DatagramTooLarge {
                length: payload.len(),
                max,
            }
            .into());
        }
        user_data.extend_from_slice(payload);

        let (short_message, tlvs) =
            if user_data.len() <= MAX_LENGTH_SHORT_MESSAGE {
                (user_data, Tlvs::new())
            } else {
                let tlv = Tlv::new(KnownTlvTag::message_payload, &user_data);
                (Vec::new(), Tlvs::from(&[tlv]))
            };

        let sequence_number = self.sequence.next();
        let pdu = Pdu::new(
            PduStatus::ESME_ROK as u32,
            sequence_number,
            SubmitSmPdu::new(
                self.source.clone(),
                Address::international(destination)?,
                SubmitEsmClass::WithUdh as u8,
                0x00,
                DATA_CODING_8BIT,
                &short_message,
                tlvs,
            )?
            .into(),
        )?;
        write_pdu(&self.writer, &pdu).await?;
        tracing::debug!(
            "submit_sm {} to {}: {} bytes",
            sequence_number,
            destination,
            payload.len()
        );
        Ok(payload.len())
    }
}

enum Flow {
    Continue,
    Stop,
}

/// The background half of the session: reads everything the SMSC sends.
struct Session {
    writer: SharedWriter,
    listener: SharedListener,
    closed: Arc<AtomicBool>,
}

impl Session {
    async fn run<R: AsyncRead + Unpin>(self, mut reader: PduReader<R>) {
        loop {
            let pdu = match reader.next_pdu().await {
                Ok(Some(Ok(pdu))) => pdu,
                Ok(Some(Err(e))) => {
                    tracing::warn!("{}", e);
                    if let Err(e) = self.nack(&e).await {
                        tracing::error!("SMPP session failed: {}", e);
                        break;
                    }
                    continue;
                }
                Ok(None) => {
                    tracing::info!("SMSC closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::error!("SMPP session failed: {}", e);
                    break;
                }
            };

            match self.handle(pdu).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(e) => {
                    tracing::error!("SMPP session failed: {}", e);
                    break;
                }
            }
        }

        self.closed.store(true, Ordering::SeqCst);
        // Dropping the listener tells the gateway no more segments will come
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    async fn handle(&self, pdu: Pdu) -> Result<Flow, TransportError> {
        let command_id = pdu.command_id().value;
        let command_status = pdu.command_status.value;
        let sequence_number = pdu.sequence_number.value;

        match pdu.into_body() {
            PduBody::DeliverSm(deliver_sm) => {
                self.respond(sequence_number, DeliverSmRespPdu::new().into())
                    .await?;
                match segment_from_deliver_sm(&deliver_sm) {
                    Ok(segment) => return Ok(self.deliver(segment).await),
                    Err(e) => tracing::warn!(
                        "dropping deliver_sm from {}: {}",
                        deliver_sm.source_addr(),
                        e
                    ),
                }
            }
            PduBody::EnquireLink(_) => {
                self.respond(sequence_number, EnquireLinkRespPdu::new().into())
                    .await?;
            }
            PduBody::EnquireLinkResp(_) => {
                tracing::trace!("enquire_link_resp {}", sequence_number);
            }
            PduBody::SubmitSmResp(resp) => {
                if command_status == PduStatus::ESME_ROK as u32 {
                    tracing::debug!(
                        "submit_sm {} accepted as message {}",
                        sequence_number,
                        resp.message_id().unwrap_or_default()
                    );
                } else {
                    tracing::warn!(
                        "submit_sm {} rejected: {}",
                        sequence_number,
                        PduStatus::describe(command_status)
                    );
                }
            }
            PduBody::Unbind(_) => {
                self.respond(sequence_number, UnbindRespPdu::new().into())
                    .await?;
                tracing::info!("SMSC unbound");
                return Ok(Flow::Stop);
            }
            PduBody::UnbindResp(_) => {
                tracing::info!("unbound from SMSC");
                return Ok(Flow::Stop);
            }
            PduBody::GenericNack(_) => {
                tracing::warn!(
                    "SMSC sent generic_nack {} for sequence {}",
                    PduStatus::describe(command_status),
                    sequence_number
                );
            }
            _ => {
                tracing::warn!(
                    "unexpected command_id {:#010X} from SMSC",
                    command_id
                );
                self.send_nack(
                    sequence_number,
                    PduStatus::ESME_RINVCMDID as u32,
                )
                .await?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn deliver(&self, segment: SmsSegment) -> Flow {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match listener {
            Some(listener) => {
                if listener.send(segment).await.is_err() {
                    tracing::info!("segment listener went away");
                    return Flow::Stop;
                }
            }
            None => tracing::warn!(
                "no segment listener registered, dropping segment from {}",
                segment.sender
            ),
        }
        Flow::Continue
    }

    async fn respond(
        &self,
        sequence_number: u32,
        body: PduBody,
    ) -> Result<(), TransportError> {
        let pdu = Pdu::new(PduStatus::ESME_ROK as u32, sequence_number, body)?;
        write_pdu(&self.writer, &pdu).await
    }

    async fn send_nack(
        &self,
        sequence_number: u32,
        command_status: u32,
    ) -> Result<(), TransportError> {
        let pdu = Pdu::new(
            command_status,
            sequence_number,
            GenericNackPdu::new().into(),
        )?;
        write_pdu(&self.writer, &pdu).await
    }

    async fn nack(&self, error: &PduParseError) -> Result<(), TransportError> {
        match error
            .sequence_number
            .filter(|s| (0x00000001..=0x7fffffff).contains(s))
        {
            Some(sequence_number) => {
                self.send_nack(sequence_number, error.status()).await
            }
            None => Ok(()),
        }
    }
}

async fn send_enquire_links(
    writer: SharedWriter,
    sequence: Arc<SequenceNumbers>,
    closed: Arc<AtomicBool>,
    period: Duration,
) {
    let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
    loop {
        ticks.tick().await;
        if closed.load(Ordering::SeqCst) {
            break;
        }
        let result = match Pdu::new(
            PduStatus::ESME_ROK as u32,
            sequence.next(),
            EnquireLinkPdu::new().into(),
        ) {
            Ok(pdu) => write_pdu(&writer, &pdu).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::warn!("enquire_link failed: {}", e);
            break;
        }
        tracing::trace!("sent enquire_link");
    }
}

/// Turn a deliver_sm into the segment the gateway reassembles.  The UDH
/// comes off the front of the user data when esm_class says one is there;
/// concatenation comes from the UDH or, failing that, the sar_* TLVs.
pub fn segment_from_deliver_sm(
    deliver_sm: &DeliverSmPdu,
) -> Result<SmsSegment, MalformedInput> {
    let esm_class = deliver_sm.esm_class();
    let sender = deliver_sm.source_addr();

    if esm_class.is_delivery_report() {
        match deliver_sm.extract_receipted_message_id() {
            Some(id) => tracing::debug!(
                "delivery receipt from {} for message {}",
                sender,
                id
            ),
            None => tracing::debug!("delivery receipt from {}", sender),
        }
        return Ok(SmsSegment {
            kind: SegmentKind::StatusReport,
            sender,
            concatenation: None,
            payload: deliver_sm.user_data().to_vec(),
        });
    }

    let kind = match esm_class.message_type_bits() {
        0 => SegmentKind::Deliver,
        bits => SegmentKind::Other(bits),
    };

    let user_data = deliver_sm.user_data();
    let (concatenation, payload) = if esm_class.has_udh() {
        let (header, rest) = split_user_data(user_data)?;
        (header.concatenation, rest)
    } else {
        (None, user_data)
    };

    Ok(SmsSegment {
        kind,
        sender,
        concatenation: concatenation
            .or_else(|| sar_concatenation(deliver_sm.tlvs())),
        payload: payload.to_vec(),
    })
}

fn sar_concatenation(tlvs: &Tlvs) -> Option<Concatenation> {
    let value = |tag| tlvs.get(tag).and_then(Tlv::value_as_u16);
    let reference = value(KnownTlvTag::sar_msg_ref_num)?;
    let total = u8::try_from(value(KnownTlvTag::sar_total_segments)?).ok()?;
    let seq = u8::try_from(value(KnownTlvTag::sar_segment_seqnum)?).ok()?;
    Some(Concatenation::new(Some(reference), seq, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::{BindTransceiverRespPdu, SubmitSmPdu};
    use tokio::io::{DuplexStream, ReadHalf, WriteHalf};

    const PORTS_UDH: [u8; 7] = [0x06, 0x05, 0x04, 0x0b, 0x84, 0x23, 0xf0];

    /// The SMSC end of an in-memory SMPP session.
    struct FakeSmsc {
        reader: PduReader<ReadHalf<DuplexStream>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl FakeSmsc {
        async fn next(&mut self) -> Pdu {
            self.reader.next_pdu().await.unwrap().unwrap().unwrap()
        }

        async fn send(&mut self, status: u32, seq: u32, body: PduBody) {
            Pdu::new(status, seq, body)
                .unwrap()
                .write(&mut self.writer)
                .await
                .unwrap();
        }
    }

    fn config() -> SmsConfig {
        SmsConfig {
            system_id: String::from("gw"),
            password: String::from("pw"),
            ..SmsConfig::default()
        }
    }

    async fn bound_with_status(
        status: u32,
    ) -> (Result<SmppTransport, GatewayError>, FakeSmsc) {
        let (client, server) = tokio::io::duplex(65536);
        let (read, write) = tokio::io::split(client);
        let (smsc_read, smsc_write) = tokio::io::split(server);
        let mut smsc = FakeSmsc {
            reader: PduReader::new(smsc_read),
            writer: smsc_write,
        };

        let config = config();
        let (transport, ()) =
            tokio::join!(SmppTransport::bind(read, write, &config), async {
                let bind = smsc.next().await;
                match bind.body() {
                    PduBody::BindTransceiver(b) => {
                        assert_eq!(b.bind_data().system_id.to_string(), "gw");
                    }
                    other => panic!("expected bind, got {:?}", other),
                }
                let resp = if status == 0 {
                    BindTransceiverRespPdu::new("SMSC").unwrap()
                } else {
                    BindTransceiverRespPdu::new_error()
                };
                smsc.send(status, bind.sequence_number.value, resp.into())
                    .await;
            });
        (transport, smsc)
    }

    async fn bound() -> (SmppTransport, FakeSmsc) {
        let (transport, smsc) = bound_with_status(0).await;
        (transport.unwrap(), smsc)
    }

    fn deliver_sm(
        esm_class: u8,
        user_data: &[u8],
        tlvs: Tlvs,
    ) -> DeliverSmPdu {
        DeliverSmPdu::new(
            Address::international("447700900123").unwrap(),
            Address::unknown("").unwrap(),
            esm_class,
            DATA_CODING_8BIT,
            user_data,
            tlvs,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn refused_bind_is_fatal() {
        let (transport, _smsc) =
            bound_with_status(PduStatus::ESME_RBINDFAIL as u32).await;
        assert!(matches!(
            transport,
            Err(GatewayError::Transport(TransportError::Status(0x0d)))
        ));
    }

    #[tokio::test]
    async fn send_puts_udh_and_payload_in_short_message() {
        let (transport, mut smsc) = bound().await;

        let sent = transport
            .send("580011600030", &[1, 2, 3], "0605040B8423F0")
            .await
            .unwrap();
        assert_eq!(sent, 3);

        let pdu = smsc.next().await;
        match pdu.body() {
            PduBody::SubmitSm(submit_sm) => {
                assert_eq!(submit_sm.destination_addr(), "580011600030");
                assert_eq!(submit_sm.esm_class(), 0x40);
                assert_eq!(submit_sm.data_coding(), 0x04);
                let mut expected = PORTS_UDH.to_vec();
                expected.extend_from_slice(&[1, 2, 3]);
                assert_eq!(submit_sm.user_data(), &expected[..]);
            }
            other => panic!("expected submit_sm, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn long_payload_goes_in_message_payload() {
        let (transport, mut smsc) = bound().await;

        let payload = vec![0x55; 300];
        transport
            .send("580011600030", &payload, "0605040B8423F0")
            .await
            .unwrap();

        let pdu = smsc.next().await;
        match pdu.body() {
            PduBody::SubmitSm(submit_sm) => {
                assert_eq!(submit_sm.user_data().len(), 307);
                assert_eq!(&submit_sm.user_data()[7..], &payload[..]);
            }
            other => panic!("expected submit_sm, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn payload_beyond_a_message_payload_tlv_is_refused() {
        let (transport, mut smsc) = bound().await;

        let payload = vec![0x55; 65529];
        assert!(matches!(
            transport.send("580011600030", &payload, "0605040B8423F0").await,
            Err(GatewayError::MalformedInput(
                MalformedInput::DatagramTooLarge {
                    length: 65529,
                    max: 65528
                }
            ))
        ));

        let (sent, pdu) = tokio::join!(
            transport.send("580011600030", &payload[1..], "0605040B8423F0"),
            smsc.next()
        );
        assert_eq!(sent.unwrap(), 65528);
        match pdu.body() {
            PduBody::SubmitSm(submit_sm) => {
                assert_eq!(submit_sm.user_data().len(), 65535);
            }
            other => panic!("expected submit_sm, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bad_descriptor_is_not_sent() {
        let (transport, _smsc) = bound().await;
        assert!(matches!(
            transport.send("580011600030", &[1], "0605X").await,
            Err(GatewayError::Transport(TransportError::InvalidDescriptor(_)))
        ));
    }

    #[tokio::test]
    async fn deliver_sm_is_acknowledged_and_passed_to_listener() {
        let (mut transport, mut smsc) = bound().await;
        let (tx, mut rx) = mpsc::channel(4);
        transport.register_segment_listener(tx);

        let mut user_data = vec![
            0x0b, 0x05, 0x04, 0x0b, 0x84, 0x23, 0xf0, 0x00, 0x03, 0x07, 0x02,
            0x01,
        ];
        user_data.extend_from_slice(&[0xaa; 4]);
        smsc.send(0, 42, deliver_sm(0x40, &user_data, Tlvs::new()).into())
            .await;

        let resp = smsc.next().await;
        assert!(matches!(resp.body(), PduBody::DeliverSmResp(_)));
        assert_eq!(resp.sequence_number.value, 42);

        let segment = rx.recv().await.unwrap();
        assert_eq!(segment.kind, SegmentKind::Deliver);
        assert_eq!(segment.sender, "447700900123");
        assert_eq!(
            segment.concatenation,
            Some(Concatenation::new(Some(7), 1, 2))
        );
        assert_eq!(segment.payload, vec![0xaa; 4]);
    }

    #[tokio::test]
    async fn enquire_link_is_answered() {
        let (_transport, mut smsc) = bound().await;
        smsc.send(0, 9, EnquireLinkPdu::new().into()).await;

        let resp = smsc.next().await;
        assert!(matches!(resp.body(), PduBody::EnquireLinkResp(_)));
        assert_eq!(resp.sequence_number.value, 9);
    }

    #[tokio::test]
    async fn unbind_from_smsc_ends_the_session() {
        let (mut transport, mut smsc) = bound().await;
        let (tx, mut rx) = mpsc::channel(4);
        transport.register_segment_listener(tx);

        smsc.send(0, 5, UnbindPdu::new().into()).await;
        let resp = smsc.next().await;
        assert!(matches!(resp.body(), PduBody::UnbindResp(_)));

        assert_eq!(rx.recv().await, None);
        assert!(transport.is_closed());
        assert!(matches!(
            transport.send("580011600030", &[1], "0605040B8423F0").await,
            Err(GatewayError::Transport(TransportError::Closed))
        ));
    }

    #[tokio::test]
    async fn unbind_from_gateway_is_sent() {
        let (transport, mut smsc) = bound().await;
        transport.unbind().await.unwrap();

        let unbind = smsc.next().await;
        assert!(matches!(unbind.body(), PduBody::Unbind(_)));
        assert!(transport.is_closed());
    }

    #[tokio::test]
    async fn unknown_command_is_nacked() {
        let (_transport, mut smsc) = bound().await;
        let submit_sm = SubmitSmPdu::new(
            Address::unknown("").unwrap(),
            Address::unknown("").unwrap(),
            0,
            0,
            0,
            b"hi",
            Tlvs::new(),
        )
        .unwrap();
        smsc.send(0, 11, submit_sm.into()).await;

        let nack = smsc.next().await;
        assert!(matches!(nack.body(), PduBody::GenericNack(_)));
        assert_eq!(nack.command_status.value, 0x03);
        assert_eq!(nack.sequence_number.value, 11);
    }

    #[tokio::test(start_paused = true)]
    async fn enquire_link_is_sent_periodically() {
        let (_transport, mut smsc) = bound().await;

        let pdu = smsc.next().await;
        assert!(matches!(pdu.body(), PduBody::EnquireLink(_)));
    }

    #[test]
    fn delivery_receipt_is_a_status_report() {
        let segment = segment_from_deliver_sm(&deliver_sm(
            0x04,
            b"id:123 stat:DELIVRD",
            Tlvs::new(),
        ))
        .unwrap();
        assert_eq!(segment.kind, SegmentKind::StatusReport);
        assert_eq!(segment.concatenation, None);
    }

    #[test]
    fn concatenation_can_come_from_sar_tlvs() {
        let tlvs = Tlvs::from(&[
            Tlv::new(KnownTlvTag::sar_msg_ref_num, &[0x01, 0x02]),
            Tlv::new(KnownTlvTag::sar_total_segments, &[3]),
            Tlv::new(KnownTlvTag::sar_segment_seqnum, &[2]),
        ]);
        let segment =
            segment_from_deliver_sm(&deliver_sm(0x00, &[9, 9], tlvs)).unwrap();
        assert_eq!(
            segment.concatenation,
            Some(Concatenation::new(Some(0x0102), 2, 3))
        );
        assert_eq!(segment.payload, vec![9, 9]);
    }

    #[test]
    fn other_message_types_keep_their_bits() {
        let segment = segment_from_deliver_sm(&deliver_sm(
            0x08,
            b"ack",
            Tlvs::new(),
        ))
        .unwrap();
        assert_eq!(segment.kind, SegmentKind::Other(0x08));
    }

    #[test]
    fn broken_udh_is_malformed() {
        let broken = deliver_sm(0x40, &[0x09, 0x00], Tlvs::new());
        assert!(matches!(
            segment_from_deliver_sm(&broken),
            Err(MalformedInput::InvalidUdh(_))
        ));
    }
}
