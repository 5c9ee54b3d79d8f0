//! Gateway configuration, read from a TOML file.  Every section and field
//! has a default, so an empty file (or no file) gives a working setup
//! against a local SMSC and a local CoAP server.

use core::fmt::{Display, Formatter};
use serde::Deserialize;
use std::error;
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::framing::{
    PortAddressing, PORT_ADDRESSING_UDH_LEN, WAP_PUSH_HEADER_LEN,
};

/// The largest datagram whose WAP Push framed form, behind a port
/// addressing UDH, still fits a `message_payload` TLV.
pub const MAX_DATAGRAM_LEN: usize =
    u16::MAX as usize - WAP_PUSH_HEADER_LEN - PORT_ADDRESSING_UDH_LEN;

/// Upper bound for the reassembly timeout and the enquire_link interval.
pub const MAX_INTERVAL_SECS: u64 = 86400;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub udp: UdpConfig,
    pub sms: SmsConfig,
    pub framing: FramingConfig,
    pub reassembly: ReassemblyConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UdpConfig {
    pub local_addr: String,
    /// Where datagrams reassembled from SMS are sent, and the only peer
    /// datagrams are accepted from.
    pub server_addr: String,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            local_addr: String::from("0.0.0.0:0"),
            server_addr: String::from("127.0.0.1:5683"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SmsConfig {
    pub smsc_addr: String,
    pub system_id: String,
    pub password: String,
    pub system_type: String,
    /// The device every outbound datagram is sent to.
    pub destination_number: String,
    pub enquire_link_interval_secs: u64,
}

impl SmsConfig {
    pub fn enquire_link_interval(&self) -> Duration {
        Duration::from_secs(self.enquire_link_interval_secs)
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            smsc_addr: String::from("127.0.0.1:2775"),
            system_id: String::from("gateway"),
            password: String::new(),
            system_type: String::new(),
            destination_number: String::from("580011600030"),
            enquire_link_interval_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FramingConfig {
    pub destination_port: u16,
    pub originating_port: u16,
    pub max_datagram_len: usize,
}

impl FramingConfig {
    pub fn ports(&self) -> PortAddressing {
        PortAddressing::new(self.destination_port, self.originating_port)
    }
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            destination_port: 2948,
            originating_port: 9200,
            max_datagram_len: 1024,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReassemblyConfig {
    pub timeout_secs: u64,
    pub max_pending_sets: usize,
}

impl ReassemblyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_pending_sets: 16,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => {
                write!(formatter, "Could not read config file: {}", e)
            }
            ConfigError::Parse(e) => {
                write!(formatter, "Could not parse config file: {}", e)
            }
            ConfigError::Invalid(reason) => {
                write!(formatter, "Invalid config: {}", reason)
            }
        }
    }
}

impl error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl GatewayConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.framing.max_datagram_len == 0 {
            return Err(ConfigError::Invalid(
                "framing.max_datagram_len must be greater than 0",
            ));
        }
        if self.framing.max_datagram_len > MAX_DATAGRAM_LEN {
            return Err(ConfigError::Invalid(
                "framing.max_datagram_len must be at most 65522",
            ));
        }
        if self.reassembly.max_pending_sets == 0 {
            return Err(ConfigError::Invalid(
                "reassembly.max_pending_sets must be greater than 0",
            ));
        }
        if self.reassembly.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "reassembly.timeout_secs must be greater than 0",
            ));
        }
        if self.reassembly.timeout_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::Invalid(
                "reassembly.timeout_secs must be at most 86400",
            ));
        }
        if self.sms.enquire_link_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sms.enquire_link_interval_secs must be greater than 0",
            ));
        }
        if self.sms.enquire_link_interval_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::Invalid(
                "sms.enquire_link_interval_secs must be at most 86400",
            ));
        }
        if self.sms.destination_number.is_empty() {
            return Err(ConfigError::Invalid(
                "sms.destination_number must not be empty",
            ));
        }
        Ok(())
    }
}
