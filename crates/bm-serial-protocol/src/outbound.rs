//! Frames that the host sends to the bus.

use bytes::BufMut;

use crate::constants::*;
use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::{finalize, seal, FrameHeader};
use crate::types::{MessageType, NodeId};

/// Frames that can be sent to the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Ask the bus to forward publishes on a topic.
    Subscribe {
        /// Topic to subscribe to.
        topic: String,
    },

    /// Publish arbitrary bytes, prefixed with a payload version byte.
    PublishRaw {
        /// Local node id.
        node_id: NodeId,
        /// Destination topic.
        topic: String,
        /// Payload version byte written before the data.
        version: u8,
        /// Payload bytes.
        data: Vec<u8>,
    },

    /// Append a line of text to a file on the console.
    PublishLog {
        /// Local node id.
        node_id: NodeId,
        /// Destination topic.
        topic: String,
        /// Target file name on the console.
        filename: String,
        /// Line of text; a newline is appended on the wire.
        text: String,
    },

    /// Print a line of text on the console terminal.
    PublishPrint {
        /// Local node id.
        node_id: NodeId,
        /// Destination topic.
        topic: String,
        /// Line of text; a newline is appended on the wire.
        text: String,
    },
}

impl OutboundFrame {
    /// Get the message type for this frame.
    pub fn message_type(&self) -> MessageType {
        match self {
            OutboundFrame::Subscribe { .. } => MessageType::Subscribe,
            OutboundFrame::PublishRaw { .. }
            | OutboundFrame::PublishLog { .. }
            | OutboundFrame::PublishPrint { .. } => MessageType::Publish,
        }
    }

    /// Topic this frame refers to.
    pub fn topic(&self) -> &str {
        match self {
            OutboundFrame::Subscribe { topic }
            | OutboundFrame::PublishRaw { topic, .. }
            | OutboundFrame::PublishLog { topic, .. }
            | OutboundFrame::PublishPrint { topic, .. } => topic,
        }
    }

    /// Encode header and body with the checksum filled in, before stuffing.
    pub fn encode_unframed(&self) -> ProtocolResult<Vec<u8>> {
        let mut buf = self.encode_body()?;
        seal(&mut buf)?;
        Ok(buf)
    }

    /// Encode the frame exactly as it goes on the wire.
    pub fn encode(&self) -> ProtocolResult<Vec<u8>> {
        finalize(self.encode_body()?)
    }

    /// Header (checksum zeroed) followed by the body.
    fn encode_body(&self) -> ProtocolResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + PUB_FIXED_SIZE + self.topic().len());
        buf.extend_from_slice(&FrameHeader::new(self.message_type()).to_bytes());

        match self {
            OutboundFrame::Subscribe { topic } => {
                put_prefixed(&mut buf, "topic", topic.as_bytes())?;
            }

            OutboundFrame::PublishRaw {
                node_id,
                topic,
                version,
                data,
            } => {
                put_publish_prefix(&mut buf, *node_id);
                put_prefixed(&mut buf, "topic", topic.as_bytes())?;
                buf.put_u8(*version);
                buf.extend_from_slice(data);
            }

            OutboundFrame::PublishLog {
                node_id,
                topic,
                filename,
                text,
            } => {
                put_publish_prefix(&mut buf, *node_id);
                put_prefixed(&mut buf, "topic", topic.as_bytes())?;
                put_console_line(&mut buf, filename, text)?;
            }

            OutboundFrame::PublishPrint {
                node_id,
                topic,
                text,
            } => {
                put_publish_prefix(&mut buf, *node_id);
                put_prefixed(&mut buf, "topic", topic.as_bytes())?;
                put_console_line(&mut buf, "", text)?;
            }
        }

        Ok(buf)
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Build a subscribe frame for `topic`.
pub fn build_subscribe(topic: &str) -> ProtocolResult<Vec<u8>> {
    OutboundFrame::Subscribe {
        topic: topic.to_string(),
    }
    .encode()
}

/// Build a publish frame carrying raw `data` after a payload version byte.
pub fn build_publish_raw(
    node_id: NodeId,
    topic: &str,
    payload_version: u8,
    data: &[u8],
) -> ProtocolResult<Vec<u8>> {
    OutboundFrame::PublishRaw {
        node_id,
        topic: topic.to_string(),
        version: payload_version,
        data: data.to_vec(),
    }
    .encode()
}

/// Build a publish frame that appends `text` to `filename` on the console.
pub fn build_publish_log(
    node_id: NodeId,
    topic: &str,
    filename: &str,
    text: &str,
) -> ProtocolResult<Vec<u8>> {
    OutboundFrame::PublishLog {
        node_id,
        topic: topic.to_string(),
        filename: filename.to_string(),
        text: text.to_string(),
    }
    .encode()
}

/// Build a publish frame that prints `text` on the console terminal.
pub fn build_publish_print(node_id: NodeId, topic: &str, text: &str) -> ProtocolResult<Vec<u8>> {
    OutboundFrame::PublishPrint {
        node_id,
        topic: topic.to_string(),
        text: text.to_string(),
    }
    .encode()
}

// ============================================================================
// Helper encode functions
// ============================================================================

fn wire_len(field: &'static str, len: usize) -> ProtocolResult<u16> {
    u16::try_from(len).map_err(|_| ProtocolError::FieldTooLong {
        field,
        max: u16::MAX as usize,
        actual: len,
    })
}

fn put_prefixed(buf: &mut Vec<u8>, field: &'static str, bytes: &[u8]) -> ProtocolResult<()> {
    buf.put_u16_le(wire_len(field, bytes.len())?);
    buf.extend_from_slice(bytes);
    Ok(())
}

fn put_publish_prefix(buf: &mut Vec<u8>, node_id: NodeId) {
    buf.put_u64_le(node_id.value());
    buf.put_u8(PUB_TYPE_DEFAULT);
    buf.put_u8(PUB_VERSION_DEFAULT);
}

/// Console payload: reserved bytes, both lengths, file name, text, newline.
fn put_console_line(buf: &mut Vec<u8>, filename: &str, text: &str) -> ProtocolResult<()> {
    let filename_len = wire_len("filename", filename.len())?;
    let data_len = wire_len("text", text.len() + 1)?;

    buf.put_bytes(0, CONSOLE_RESERVED_SIZE);
    buf.put_u16_le(filename_len);
    buf.put_u16_le(data_len);
    buf.extend_from_slice(filename.as_bytes());
    buf.extend_from_slice(text.as_bytes());
    buf.put_u8(b'\n');
    Ok(())
}
