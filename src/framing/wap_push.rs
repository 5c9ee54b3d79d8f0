use crate::error::MalformedInput;

/// Push id 0x01, PDU type push 0x06, header length 3, content type
/// application/vnd.syncml.notification (0xC4), X-WAP-Application-ID (0xAF)
/// with value x-wap-application:lwm2m.dm (0x9A).
pub const WAP_PUSH_HEADER: [u8; 6] = [0x01, 0x06, 0x03, 0xC4, 0xAF, 0x9A];

pub const WAP_PUSH_HEADER_LEN: usize = WAP_PUSH_HEADER.len();

/// The SMS user data for one datagram: header then datagram.
pub fn prepend(datagram: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WAP_PUSH_HEADER_LEN + datagram.len());
    out.extend_from_slice(&WAP_PUSH_HEADER);
    out.extend_from_slice(datagram);
    out
}

/// Split reassembled user data into its 6 header bytes and the datagram.
/// The header is not checked here; see `is_wap_push_header`.
pub fn split(payload: &[u8]) -> Result<(&[u8], &[u8]), MalformedInput> {
    if payload.len() < WAP_PUSH_HEADER_LEN {
        return Err(MalformedInput::TooShort(payload.len()));
    }
    Ok(payload.split_at(WAP_PUSH_HEADER_LEN))
}

pub fn is_wap_push_header(header: &[u8]) -> bool {
    header == WAP_PUSH_HEADER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_puts_header_first() {
        let out = prepend(&[0xAA; 10]);
        assert_eq!(out.len(), 16);
        assert_eq!(&out[..6], &[0x01, 0x06, 0x03, 0xC4, 0xAF, 0x9A]);
        assert_eq!(&out[6..], &[0xAA; 10]);
    }

    #[test]
    fn empty_datagram_is_just_the_header() {
        assert_eq!(prepend(&[]), WAP_PUSH_HEADER.to_vec());
        let (header, body) = split(&WAP_PUSH_HEADER).unwrap();
        assert!(is_wap_push_header(header));
        assert!(body.is_empty());
    }

    #[test]
    fn split_of_short_payload_fails() {
        assert_eq!(split(&[0x01, 0x06]), Err(MalformedInput::TooShort(2)));
    }

    #[test]
    fn foreign_header_is_split_but_not_recognised() {
        let (header, body) = split(&[0, 0, 0, 0, 0, 0, 7]).unwrap();
        assert!(!is_wap_push_header(header));
        assert_eq!(body, &[7]);
    }
}
