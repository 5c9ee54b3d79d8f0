pub mod bind_data;
pub mod bind_resp_data;
pub mod sm_data;
