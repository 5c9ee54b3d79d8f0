use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{GatewayError, MalformedInput};
use crate::framing::{hex_preview, wap_push, WAP_PUSH_HEADER_LEN};
use crate::sms::{Concatenation, SegmentKind, SmsSegment};

/// What happened to one accepted segment.
#[derive(Debug, PartialEq)]
pub enum Reassembly {
    /// The last segment of a datagram arrived.  Holds the datagram with the
    /// WAP Push header already removed.
    Complete(Vec<u8>),
    Pending,
    StatusReport,
}

/// Segments are only ever collected per sender and reference, so two
/// devices (or two messages from one device) cannot interleave.
type SetKey = (String, Option<u16>);

/// Longer timeouts are cut down to this, which keeps every deadline a
/// representable `Instant`.
pub const MAX_REASSEMBLY_TIMEOUT: Duration = Duration::from_secs(86400);

#[derive(Debug)]
struct PartialSet {
    total_segments: u8,
    next_expected: u8,
    data: Vec<u8>,
    deadline: Instant,
}

impl PartialSet {
    fn new(total_segments: u8, deadline: Instant) -> Self {
        Self {
            total_segments,
            next_expected: 1,
            data: Vec::new(),
            deadline,
        }
    }

    fn append(
        &mut self,
        concatenation: &Concatenation,
        payload: &[u8],
        capacity: usize,
        deadline: Instant,
    ) -> Result<(), MalformedInput> {
        if concatenation.total_segments != self.total_segments {
            return Err(MalformedInput::TotalMismatch {
                expected: self.total_segments,
                actual: concatenation.total_segments,
            });
        }
        if concatenation.sequence_number != self.next_expected {
            return Err(MalformedInput::UnexpectedSequence {
                expected: self.next_expected,
                actual: concatenation.sequence_number,
            });
        }
        let length = self.data.len() + payload.len();
        if length > capacity {
            return Err(MalformedInput::CapacityExceeded { length, capacity });
        }

        self.data.extend_from_slice(payload);
        self.next_expected = self.next_expected.saturating_add(1);
        self.deadline = deadline;
        Ok(())
    }
}

/// Collects inbound segments back into datagrams.
///
/// Each open set holds at most `max_datagram_len` plus the WAP Push header.
/// A set is gone as soon as it completes, is rejected, is superseded by a
/// new first segment, or passes its deadline.  Nothing in here is shared:
/// the gateway task owns the reassembler.
#[derive(Debug)]
pub struct Reassembler {
    capacity: usize,
    max_pending_sets: usize,
    timeout: Duration,
    sets: HashMap<SetKey, PartialSet>,
}

impl Reassembler {
    pub fn new(
        max_datagram_len: usize,
        max_pending_sets: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            capacity: max_datagram_len + WAP_PUSH_HEADER_LEN,
            max_pending_sets,
            timeout: timeout.min(MAX_REASSEMBLY_TIMEOUT),
            sets: HashMap::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn accept(
        &mut self,
        segment: SmsSegment,
        now: Instant,
    ) -> Result<Reassembly, GatewayError> {
        match segment.kind {
            SegmentKind::StatusReport => return Ok(Reassembly::StatusReport),
            SegmentKind::Deliver => {}
            kind => return Err(GatewayError::UnrecognizedSegment(kind)),
        }

        match segment.concatenation {
            None => {
                if segment.payload.len() > self.capacity {
                    return Err(MalformedInput::CapacityExceeded {
                        length: segment.payload.len(),
                        capacity: self.capacity,
                    }
                    .into());
                }
                Ok(Reassembly::Complete(strip_header(&segment.payload)?))
            }
            Some(concatenation) => self.accept_concatenated(
                segment.sender,
                concatenation,
                &segment.payload,
                now,
            ),
        }
    }

    fn accept_concatenated(
        &mut self,
        sender: String,
        concatenation: Concatenation,
        payload: &[u8],
        now: Instant,
    ) -> Result<Reassembly, GatewayError> {
        let Concatenation {
            reference,
            sequence_number,
            total_segments,
        } = concatenation;
        if sequence_number == 0 || sequence_number > total_segments {
            return Err(MalformedInput::InvalidSequence {
                sequence_number,
                total_segments,
            }
            .into());
        }

        let key = (sender, reference);
        if self.sets.get(&key).map_or(false, |set| set.deadline <= now) {
            tracing::debug!("dropping expired set {:?}", key);
            self.sets.remove(&key);
        }

        if sequence_number == 1 {
            if self.sets.remove(&key).is_some() {
                tracing::warn!("new first segment supersedes set {:?}", key);
            } else if self.sets.len() >= self.max_pending_sets {
                self.evict_earliest();
            }
            self.sets.insert(
                key.clone(),
                PartialSet::new(total_segments, now + self.timeout),
            );
        }

        let appended = match self.sets.get_mut(&key) {
            Some(set) => set.append(
                &concatenation,
                payload,
                self.capacity,
                now + self.timeout,
            ),
            None => {
                return Err(MalformedInput::NoOpenSet(sequence_number).into())
            }
        };
        if let Err(e) = appended {
            self.sets.remove(&key);
            return Err(e.into());
        }

        if sequence_number < total_segments {
            tracing::trace!(
                "segment {}/{} of {:?} buffered",
                sequence_number,
                total_segments,
                key
            );
            return Ok(Reassembly::Pending);
        }

        let data = self
            .sets
            .remove(&key)
            .map(|set| set.data)
            .unwrap_or_default();
        Ok(Reassembly::Complete(strip_header(&data)?))
    }

    fn evict_earliest(&mut self) {
        let earliest = self
            .sets
            .iter()
            .min_by_key(|(_, set)| set.deadline)
            .map(|(key, _)| key.clone());
        if let Some(key) = earliest {
            tracing::warn!("too many partial sets, evicting {:?}", key);
            self.sets.remove(&key);
        }
    }

    /// Drop every set whose deadline has passed.  Returns how many went.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.sets.len();
        self.sets.retain(|key, set| {
            let keep = set.deadline > now;
            if !keep {
                tracing::debug!(
                    "set {:?} expired with {} of {} segments",
                    key,
                    set.next_expected.saturating_sub(1),
                    set.total_segments
                );
            }
            keep
        });
        before - self.sets.len()
    }

    /// Bytes held across all open sets.
    pub fn accumulated_length(&self) -> usize {
        self.sets.values().map(|set| set.data.len()).sum()
    }

    pub fn pending_sets(&self) -> usize {
        self.sets.len()
    }
}

fn strip_header(payload: &[u8]) -> Result<Vec<u8>, MalformedInput> {
    let (header, datagram) = wap_push::split(payload)?;
    if !wap_push::is_wap_push_header(header) {
        tracing::warn!(
            "unexpected WAP Push header {}, stripping it anyway",
            hex_preview(header, WAP_PUSH_HEADER_LEN)
        );
    }
    Ok(datagram.to_vec())
}
