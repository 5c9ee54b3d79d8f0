/// https://smpp.org/SMPP_v3_4_Issue1_2.pdf section 5.2.12
///
/// The gateway always submits in default mode with a user data header
/// (port addressing) at the start of short_message.
#[repr(u8)]
pub enum SubmitEsmClass {
    Default = (SubmitMessageMode::Default as u8
        | SubmitMessageType::Default as u8),
    WithUdh = (SubmitMessageMode::Default as u8
        | SubmitMessageType::Default as u8
        | UDHI_MASK),
}

#[allow(dead_code)]
#[repr(u8)]
pub enum SubmitMessageMode {
    // Significant bits: ......00 (the last 2)
    Default = 0b00000000,
    DatagramMode = 0b00000001,
    ForwardMode = 0b00000010,
    StoreAndForwardMode = 0b00000011,
}

#[repr(u8)]
pub enum SubmitMessageType {
    // Significant bits: ..0000.. (the middle 4)
    Default = 0b00000000,
}

/// https://smpp.org/SMPP_v3_4_Issue1_2.pdf section 5.2.12
#[allow(dead_code)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
pub enum DeliverMessageType {
    // Significant bits: ..0000.. (the middle 4)
    Default = 0b00000000,
    SmscDeliveryReceipt = 0b00000100,
    SmeDeliveryAcknowledgement = 0b00001000,
    SmeManualUserAcknowledgement = 0b00010000,
    ConversationAbort = 0b00011000,
    IntermediateDeliveryNotification = 0b00100000,
}

/// GSM network specific features (bits 7-6): user data header indicator.
pub const UDHI_MASK: u8 = 0b01000000;

const MESSAGE_TYPE_MASK: u8 = 0b00111100;

/// A deliver_sm esm_class broken into the parts the gateway cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliverEsmClass(pub u8);

impl DeliverEsmClass {
    pub fn has_udh(&self) -> bool {
        self.0 & UDHI_MASK != 0
    }

    /// The raw message type bits (..xxxx..).
    pub fn message_type_bits(&self) -> u8 {
        self.0 & MESSAGE_TYPE_MASK
    }

    /// None for message type values SMPP 3.4 does not define.
    pub fn message_type(&self) -> Option<DeliverMessageType> {
        num_traits::FromPrimitive::from_u8(self.message_type_bits())
    }

    pub fn is_delivery_report(&self) -> bool {
        matches!(
            self.message_type(),
            Some(DeliverMessageType::SmscDeliveryReceipt)
                | Some(DeliverMessageType::IntermediateDeliveryNotification)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_with_udh_sets_udhi_bit() {
        assert_eq!(SubmitEsmClass::WithUdh as u8, 0x40);
        assert_eq!(SubmitEsmClass::Default as u8, 0x00);
    }

    #[test]
    fn plain_deliver_with_udh() {
        let esm = DeliverEsmClass(0x40);
        assert!(esm.has_udh());
        assert_eq!(esm.message_type(), Some(DeliverMessageType::Default));
        assert!(!esm.is_delivery_report());
    }

    #[test]
    fn delivery_receipts_are_reports() {
        assert!(DeliverEsmClass(0x04).is_delivery_report());
        assert!(DeliverEsmClass(0x20).is_delivery_report());
        assert!(!DeliverEsmClass(0x04).has_udh());
    }

    #[test]
    fn undefined_message_type_is_none() {
        let esm = DeliverEsmClass(0b00111100);
        assert_eq!(esm.message_type(), None);
        assert_eq!(esm.message_type_bits(), 0b00111100);
    }
}
