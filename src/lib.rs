#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate num_derive;

pub mod async_result;
pub mod codec;
pub mod config;
pub mod datagram;
pub mod error;
pub mod framing;
pub mod gateway;
pub mod pdu;
pub mod sms;

#[cfg(test)]
mod unittest_utils;
