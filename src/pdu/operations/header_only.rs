//! Operations whose PDU is the 16 octet header and nothing else.  They
//! differ only in the command_status values they may carry.

use std::io;

use crate::pdu::formats::WriteStream;
use crate::pdu::{PduParseError, PduParseErrorBody};

macro_rules! header_only_pdu {
    ($(#[$doc:meta])* $name:ident, $status_allowed:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default, PartialEq)]
        pub struct $name {}

        impl $name {
            pub fn new() -> Self {
                Self {}
            }

            pub async fn write(
                &self,
                _stream: &mut WriteStream,
            ) -> io::Result<()> {
                Ok(())
            }

            pub fn parse(
                _bytes: &mut dyn io::BufRead,
                _command_status: u32,
            ) -> Result<Self, PduParseError> {
                Ok(Self {})
            }

            pub fn validate_command_status(
                self,
                command_status: u32,
            ) -> Result<Self, PduParseError> {
                let allowed: fn(u32) -> bool = $status_allowed;
                if allowed(command_status) {
                    Ok(self)
                } else {
                    Err(PduParseError::new(PduParseErrorBody::UnexpectedStatus))
                }
            }
        }
    };
}

header_only_pdu!(
    /// Either end may send this to check the session is alive.
    EnquireLinkPdu,
    |status| status == 0
);
header_only_pdu!(EnquireLinkRespPdu, |_| true);
header_only_pdu!(UnbindPdu, |status| status == 0);
header_only_pdu!(UnbindRespPdu, |_| true);
header_only_pdu!(
    /// Sent back for a PDU that could not be handled at all.  The
    /// command_status says why, so it is never ESME_ROK.
    GenericNackPdu,
    |status| status != 0
);
