use crate::error::{MalformedInput, TransportError};
use crate::sms::Concatenation;

/// https://www.3gpp.org/ftp/Specs/archive/23_series/23.040 section 9.2.3.24
///
/// The information elements the gateway understands.  Any other element is
/// skipped over.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum InformationElementId {
    Concatenated8BitReference = 0x00,
    ApplicationPort8Bit = 0x04,
    ApplicationPort16Bit = 0x05,
    Concatenated16BitReference = 0x08,
}

impl InformationElementId {
    pub fn new(iei: u8) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(iei)
    }
}

/// UDHL, IEI and IEDL plus two 16-bit ports.
pub const PORT_ADDRESSING_UDH_LEN: usize = 7;

/// Application port addressing, 16-bit scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortAddressing {
    pub destination_port: u16,
    pub originating_port: u16,
}

impl PortAddressing {
    pub fn new(destination_port: u16, originating_port: u16) -> Self {
        Self {
            destination_port,
            originating_port,
        }
    }

    /// A complete UDH holding just this element: UDHL, IEI, IEDL, ports.
    pub fn to_bytes(&self) -> [u8; PORT_ADDRESSING_UDH_LEN] {
        let [d0, d1] = self.destination_port.to_be_bytes();
        let [o0, o1] = self.originating_port.to_be_bytes();
        [
            0x06,
            InformationElementId::ApplicationPort16Bit as u8,
            0x04,
            d0,
            d1,
            o0,
            o1,
        ]
    }

    /// The textual form handed to the SMS transport, e.g. "0605040B8423F0".
    pub fn descriptor(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{:02X}", b)).collect()
    }
}

/// Turn a textual UDH descriptor back into bytes.
pub fn decode_descriptor(descriptor: &str) -> Result<Vec<u8>, TransportError> {
    let invalid = || TransportError::InvalidDescriptor(String::from(descriptor));
    if descriptor.len() % 2 != 0 || !descriptor.is_ascii() {
        return Err(invalid());
    }
    descriptor
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(invalid)
        })
        .collect()
}

/// What the gateway learned from an inbound UDH.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserDataHeader {
    pub concatenation: Option<Concatenation>,
    pub ports: Option<PortAddressing>,
}

/// Parse the UDH at the front of `data` and return it with the remaining
/// user data.
pub fn split_user_data(
    data: &[u8],
) -> Result<(UserDataHeader, &[u8]), MalformedInput> {
    let udhl = match data.first() {
        Some(udhl) => usize::from(*udhl),
        None => return Err(MalformedInput::InvalidUdh("user data is empty")),
    };
    if data.len() < 1 + udhl {
        return Err(MalformedInput::InvalidUdh("UDHL runs past user data"));
    }
    let (mut elements, rest) = (&data[1..1 + udhl], &data[1 + udhl..]);

    let mut header = UserDataHeader::default();
    while !elements.is_empty() {
        if elements.len() < 2 {
            return Err(MalformedInput::InvalidUdh("truncated element header"));
        }
        let (iei, iedl) = (elements[0], elements[1] as usize);
        if elements.len() < 2 + iedl {
            return Err(MalformedInput::InvalidUdh("element runs past UDH"));
        }
        let value = &elements[2..2 + iedl];
        elements = &elements[2 + iedl..];

        match (InformationElementId::new(iei), value) {
            (
                Some(InformationElementId::Concatenated8BitReference),
                [reference, total, seq],
            ) => {
                header.concatenation = Some(Concatenation::new(
                    Some(u16::from(*reference)),
                    *seq,
                    *total,
                ));
            }
            (
                Some(InformationElementId::Concatenated16BitReference),
                [ref_hi, ref_lo, total, seq],
            ) => {
                header.concatenation = Some(Concatenation::new(
                    Some(u16::from_be_bytes([*ref_hi, *ref_lo])),
                    *seq,
                    *total,
                ));
            }
            (Some(InformationElementId::ApplicationPort8Bit), [dest, orig]) => {
                header.ports = Some(PortAddressing::new(
                    u16::from(*dest),
                    u16::from(*orig),
                ));
            }
            (
                Some(InformationElementId::ApplicationPort16Bit),
                [d0, d1, o0, o1],
            ) => {
                header.ports = Some(PortAddressing::new(
                    u16::from_be_bytes([*d0, *d1]),
                    u16::from_be_bytes([*o0, *o1]),
                ));
            }
            (Some(_), _) => {
                return Err(MalformedInput::InvalidUdh(
                    "element has the wrong length",
                ))
            }
            (None, _) => {
                tracing::trace!("skipping UDH element {:#04x}", iei);
            }
        }
    }

    Ok((header, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_give_the_lwm2m_descriptor() {
        let ports = PortAddressing::new(2948, 9200);
        assert_eq!(ports.descriptor(), "0605040B8423F0");
        assert_eq!(
            decode_descriptor(&ports.descriptor()).unwrap(),
            ports.to_bytes().to_vec()
        );
    }

    #[test]
    fn descriptor_decoding_accepts_lowercase() {
        assert_eq!(
            decode_descriptor("0605040b8423f0").unwrap(),
            vec![0x06, 0x05, 0x04, 0x0b, 0x84, 0x23, 0xf0]
        );
    }

    #[test]
    fn bad_descriptors_are_rejected() {
        assert!(matches!(
            decode_descriptor("06050"),
            Err(TransportError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            decode_descriptor("06ZZ"),
            Err(TransportError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            decode_descriptor("0é"),
            Err(TransportError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn ports_only_udh() {
        let data = [0x06, 0x05, 0x04, 0x0b, 0x84, 0x23, 0xf0, 0x01, 0x02];
        let (header, rest) = split_user_data(&data).unwrap();
        assert_eq!(header.ports, Some(PortAddressing::new(2948, 9200)));
        assert_eq!(header.concatenation, None);
        assert_eq!(rest, &[0x01, 0x02]);
    }

    #[test]
    fn ports_and_8bit_concatenation() {
        let data = [
            0x0b, // UDHL
            0x05, 0x04, 0x0b, 0x84, 0x23, 0xf0, // ports
            0x00, 0x03, 0x2a, 0x03, 0x02, // ref 42, 3 parts, this is 2
            0xaa,
        ];
        let (header, rest) = split_user_data(&data).unwrap();
        assert_eq!(
            header.concatenation,
            Some(Concatenation::new(Some(42), 2, 3))
        );
        assert!(header.ports.is_some());
        assert_eq!(rest, &[0xaa]);
    }

    #[test]
    fn concatenation_with_16bit_reference_and_8bit_ports() {
        let data = [
            0x0a, // UDHL
            0x08, 0x04, 0x12, 0x34, 0x02, 0x01, // ref 0x1234, part 1 of 2
            0x04, 0x02, 0x10, 0x20, // 8-bit ports
        ];
        let (header, rest) = split_user_data(&data).unwrap();
        assert_eq!(
            header.concatenation,
            Some(Concatenation::new(Some(0x1234), 1, 2))
        );
        assert_eq!(header.ports, Some(PortAddressing::new(0x10, 0x20)));
        assert!(rest.is_empty());
    }

    #[test]
    fn unknown_elements_are_skipped() {
        let data = [0x03, 0x24, 0x01, 0x00, 0x99];
        let (header, rest) = split_user_data(&data).unwrap();
        assert_eq!(header, UserDataHeader::default());
        assert_eq!(rest, &[0x99]);
    }

    #[test]
    fn lengths_running_past_the_data_are_invalid() {
        assert!(split_user_data(&[]).is_err());
        assert!(split_user_data(&[0x06, 0x05, 0x04]).is_err());
        assert!(split_user_data(&[0x03, 0x00, 0x05, 0x01]).is_err());
        assert!(split_user_data(&[0x01, 0x00]).is_err());
    }

    #[test]
    fn known_element_with_wrong_length_is_invalid() {
        assert_eq!(
            split_user_data(&[0x04, 0x00, 0x02, 0x01, 0x01]),
            Err(MalformedInput::InvalidUdh("element has the wrong length"))
        );
    }
}
