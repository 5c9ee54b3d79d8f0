//! The framing/reassembly codec between datagrams and short messages.

pub mod inbound;
pub mod outbound;

pub use inbound::{Reassembler, Reassembly};
pub use outbound::OutboundCodec;
