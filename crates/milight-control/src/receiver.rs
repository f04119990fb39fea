//! Receiver identity and link settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::error::{ControlError, Result};
use crate::pacing::DEFAULT_DELAY;

/// UDP port the receiver listens on for commands
pub const COMMAND_PORT: u16 = 8899;

/// A Wi-Fi receiver box reachable on the local network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Spacing between consecutive commands
    #[serde(default = "default_delay", with = "millis")]
    pub delay: Duration,
    /// Pace commands automatically; turn off to pace them yourself
    #[serde(default = "default_true")]
    pub auto_delay: bool,
    /// MAC address text reported during discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_id: Option<String>,
}

fn default_port() -> u16 {
    COMMAND_PORT
}

fn default_delay() -> Duration {
    DEFAULT_DELAY
}

fn default_true() -> bool {
    true
}

impl Receiver {
    /// Receiver on the standard command port with default pacing
    pub fn new(address: IpAddr) -> Self {
        Self {
            address,
            port: COMMAND_PORT,
            delay: DEFAULT_DELAY,
            auto_delay: true,
            hardware_id: None,
        }
    }

    /// Parse an `ip` or `ip:port` string.
    pub fn parse(text: &str) -> Result<Self> {
        if let Ok(addr) = text.parse::<SocketAddr>() {
            return Ok(Self::new(addr.ip()).with_port(addr.port()));
        }
        let ip = text
            .parse::<IpAddr>()
            .map_err(|e| ControlError::InvalidAddress(format!("{}: {}", text, e)))?;
        Ok(Self::new(ip))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_auto_delay(mut self, auto_delay: bool) -> Self {
        self.auto_delay = auto_delay;
        self
    }

    /// Destination for command datagrams
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hardware_id {
            Some(id) => write!(f, "{} ({})", self.socket_addr(), id),
            None => write!(f, "{}", self.socket_addr()),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
