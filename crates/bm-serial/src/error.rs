//! Error types for the serial client.

use std::io;
use std::path::PathBuf;

use bm_serial_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced to the caller of a send or poll operation.
///
/// Malformed inbound frames never show up here; they are discarded inside
/// `poll` and reported through its summary.
#[derive(Debug, Error)]
pub enum SerialError {
    /// The transport failed to read or write.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    /// The transport accepted fewer bytes than the frame length.
    #[error("short write: wrote {written} of {expected} bytes")]
    ShortWrite {
        /// Frame length.
        expected: usize,
        /// Bytes the transport accepted.
        written: usize,
    },

    /// An outbound frame could not be encoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Config is not valid YAML for the expected schema.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type alias for serial client operations.
pub type Result<T> = std::result::Result<T, SerialError>;
