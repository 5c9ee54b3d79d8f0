pub mod bind_transceiver;
pub mod deliver_sm;
pub mod header_only;
pub mod submit_sm;
pub mod submit_sm_resp;
