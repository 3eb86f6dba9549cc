//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when working with the serial protocol.
///
/// Decode errors describe why an inbound frame was discarded; they are never
/// fatal to the receive loop. Encode errors reject arguments that cannot be
/// represented on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame or payload is too short to be valid.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Message type byte is not part of the protocol.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// Topic length in a publish runs past the end of the payload.
    #[error("topic overruns payload: topic ends at {end}, payload is {actual} bytes")]
    TopicOverrun {
        /// Offset the topic would end at.
        end: usize,
        /// Actual payload length.
        actual: usize,
    },

    /// A variable-length field does not fit its 16-bit length prefix.
    #[error("{field} too long: maximum {max} bytes, got {actual}")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum encodable length.
        max: usize,
        /// Actual length.
        actual: usize,
    },

    /// A node id string could not be parsed.
    #[error("invalid node id: {0}")]
    InvalidNodeId(String),
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
