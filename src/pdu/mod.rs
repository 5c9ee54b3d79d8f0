mod check;
pub mod data;
mod esm_class;
pub mod formats;
mod operations;
mod pdu;
mod pduparseerror;
mod status;
pub mod tlvs;

pub use check::{
    CheckError, CheckOutcome, CommandLengthError, MAX_PDU_LENGTH,
    MIN_PDU_LENGTH,
};
pub use data::sm_data::{Address, MAX_LENGTH_SHORT_MESSAGE};
pub use esm_class::{
    DeliverEsmClass, DeliverMessageType, SubmitEsmClass, UDHI_MASK,
};
pub use formats::OctetStringCreationError;
pub use operations::bind_transceiver::{
    BindTransceiverPdu, BindTransceiverRespPdu,
};
pub use operations::deliver_sm::{DeliverSmPdu, DeliverSmRespPdu};
pub use operations::header_only::{
    EnquireLinkPdu, EnquireLinkRespPdu, GenericNackPdu, UnbindPdu,
    UnbindRespPdu,
};
pub use operations::submit_sm::SubmitSmPdu;
pub use operations::submit_sm_resp::SubmitSmRespPdu;
pub use pdu::{Pdu, PduBody};
pub use pduparseerror::{PduParseError, PduParseErrorBody};
pub use status::PduStatus;
