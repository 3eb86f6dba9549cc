//! YAML configuration for a serial client.
//!
//! ```yaml
//! node_id: 0xC0FFEEEEF0CACC1A
//! baud_rate: 115200
//! link:
//!   idle_timeout_ms: 500
//!   poll_interval_ms: 10
//!   rx_buffer_size: 512
//! topics:
//!   transmit: spotter/transmit-data
//!   log: spotter/fprintf
//!   print: spotter/printf
//! subscriptions:
//!   - device/led
//! ```
//!
//! Every field is optional.

use std::path::Path;
use std::time::Duration;

use bm_serial_protocol::{NodeId, TOPIC_CONSOLE_LOG, TOPIC_CONSOLE_PRINT, TOPIC_CONSOLE_TRANSMIT};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::link::{LinkConfig, DEFAULT_IDLE_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_RX_BUFFER_SIZE};

/// Node id used when none is configured.
pub const DEFAULT_NODE_ID: NodeId = NodeId::new(0xC0FF_EEEE_F0CA_CC1A);

/// UART baud rate used when none is configured.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BmSerialConfig {
    /// Identity stamped on outbound publishes.
    pub node_id: NodeId,
    /// UART speed. Informational; the host opens the port.
    pub baud_rate: u32,
    /// Link reader timing.
    pub link: LinkSettings,
    /// Console topics.
    pub topics: TopicConfig,
    /// Topics to subscribe to at startup.
    pub subscriptions: Vec<String>,
}

impl Default for BmSerialConfig {
    fn default() -> Self {
        BmSerialConfig {
            node_id: DEFAULT_NODE_ID,
            baud_rate: DEFAULT_BAUD_RATE,
            link: LinkSettings::default(),
            topics: TopicConfig::default(),
            subscriptions: Vec::new(),
        }
    }
}

impl BmSerialConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: BmSerialConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check values that parse but cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be non-zero".into()));
        }
        self.link.validate()?;
        self.topics.validate()?;
        if let Some(pos) = self.subscriptions.iter().position(|t| t.is_empty()) {
            return Err(ConfigError::Invalid(format!("subscriptions[{pos}] is empty")));
        }
        Ok(())
    }
}

/// Link reader timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkSettings {
    /// Silence that ends a burst.
    pub idle_timeout_ms: u64,
    /// Pause between empty reads.
    pub poll_interval_ms: u64,
    /// Largest single read from the transport.
    pub rx_buffer_size: usize,
}

impl Default for LinkSettings {
    fn default() -> Self {
        LinkSettings {
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT.as_millis() as u64,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            rx_buffer_size: DEFAULT_RX_BUFFER_SIZE,
        }
    }
}

impl LinkSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_timeout_ms == 0 {
            return Err(ConfigError::Invalid("link.idle_timeout_ms must be non-zero".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("link.poll_interval_ms must be non-zero".into()));
        }
        if self.rx_buffer_size == 0 {
            return Err(ConfigError::Invalid("link.rx_buffer_size must be non-zero".into()));
        }
        Ok(())
    }
}

impl From<LinkSettings> for LinkConfig {
    fn from(settings: LinkSettings) -> Self {
        LinkConfig {
            idle_timeout: Duration::from_millis(settings.idle_timeout_ms),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            rx_buffer_size: settings.rx_buffer_size,
        }
    }
}

/// Well-known console topics. They must match what the peer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopicConfig {
    /// Raw data forwarded to the console's transmit path.
    pub transmit: String,
    /// Lines appended to a file on the console.
    pub log: String,
    /// Lines printed on the console terminal.
    pub print: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        TopicConfig {
            transmit: TOPIC_CONSOLE_TRANSMIT.to_string(),
            log: TOPIC_CONSOLE_LOG.to_string(),
            print: TOPIC_CONSOLE_PRINT.to_string(),
        }
    }
}

impl TopicConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, topic) in [("transmit", &self.transmit), ("log", &self.log), ("print", &self.print)] {
            if topic.is_empty() {
                return Err(ConfigError::Invalid(format!("topics.{name} is empty")));
            }
        }
        Ok(())
    }
}
