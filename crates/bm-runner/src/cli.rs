//! Command-line arguments.

use std::path::PathBuf;

use bm_serial::{BmSerialConfig, ConfigError};
use bm_serial_protocol::NodeId;
use clap::{Parser, Subcommand};

/// Talk to a Bristlemouth bus over a UART exposed on TCP.
#[derive(Debug, Parser)]
#[command(name = "bm-serial", version)]
#[command(about = "Bristlemouth serial client", long_about = None)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// UART endpoint as host:port.
    #[arg(long)]
    pub connect: String,

    /// Node id stamped on outbound publishes (decimal or 0x-prefixed hex).
    #[arg(long)]
    pub node_id: Option<NodeId>,

    /// Silence in milliseconds that ends an inbound frame.
    #[arg(long)]
    pub idle_timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Subscribe and log every publish until interrupted.
    Listen {
        /// Extra topic to subscribe to, on top of the configured ones.
        #[arg(short, long = "topic")]
        topics: Vec<String>,
    },

    /// Send raw data out the console's transmit path.
    Transmit {
        /// Data to send.
        data: String,

        /// Treat the data as hex.
        #[arg(long)]
        hex: bool,
    },

    /// Print a line on the console terminal.
    Print {
        /// Text to print.
        text: String,
    },

    /// Append a line to a file on the console.
    Log {
        /// File name on the console.
        #[arg(short, long)]
        file: String,

        /// Text to append.
        text: String,
    },
}

impl Cli {
    /// Load the configuration file, if any, and apply command-line overrides.
    pub fn load_config(&self) -> Result<BmSerialConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => BmSerialConfig::from_file(path)?,
            None => BmSerialConfig::default(),
        };
        if let Some(node_id) = self.node_id {
            config.node_id = node_id;
        }
        if let Some(ms) = self.idle_timeout_ms {
            config.link.idle_timeout_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}
