//! Byte-level framing of datagrams carried over SMS: the WAP Push header
//! in front of the datagram, and the user data header (UDH) in front of
//! each short message.

pub mod udh;
pub mod wap_push;

pub use udh::{
    decode_descriptor, split_user_data, PortAddressing, UserDataHeader,
    PORT_ADDRESSING_UDH_LEN,
};
pub use wap_push::{WAP_PUSH_HEADER, WAP_PUSH_HEADER_LEN};

/// Space separated lowercase hex of the first `max` bytes, for log lines.
pub fn hex_preview(data: &[u8], max: usize) -> String {
    let mut s = String::new();
    for (i, b) in data.iter().take(max).enumerate() {
        if i > 0 {
            s.push(' ');
        }
        s.push_str(&format!("{:02x}", b));
    }
    if data.len() > max {
        s.push_str(" ...");
    }
    s
}
