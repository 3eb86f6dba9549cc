//! Inbound publish records.
//!
//! Body layout after the 4-byte frame header:
//!
//! ```text
//! +---------+------+---------+-----------+-------------------+------------+
//! | node_id | type | version | topic_len | topic[topic_len]  | data ...   |
//! | u64 LE  | u8   | u8      | u16 LE    |                   |            |
//! +---------+------+---------+-----------+-------------------+------------+
//! ```

use bytes::Buf;

use crate::constants::PUB_FIXED_SIZE;
use crate::error::{ProtocolError, ProtocolResult};
use crate::types::NodeId;

/// Trailing characters ignored when comparing topics or reading text data.
const TEXT_TERMINATORS: &[char] = &['\0', '\r', '\n'];

/// A decoded publish message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    /// Node that published the message.
    pub node_id: NodeId,
    /// Publish type byte.
    pub msg_type: u8,
    /// Publish version byte.
    pub version: u8,
    /// Topic length as carried on the wire.
    pub topic_len: u16,
    /// Topic, lossily decoded if the bytes were not valid UTF-8.
    pub topic: String,
    /// Payload bytes after the topic, untouched.
    pub data: Vec<u8>,
}

impl PublishRecord {
    /// Decode a publish body (the frame without its 4-byte header).
    pub fn decode(payload: &[u8]) -> ProtocolResult<Self> {
        if payload.len() < PUB_FIXED_SIZE {
            return Err(ProtocolError::FrameTooShort {
                expected: PUB_FIXED_SIZE,
                actual: payload.len(),
            });
        }

        let mut buf = payload;
        let node_id = NodeId::new(buf.get_u64_le());
        let msg_type = buf.get_u8();
        let version = buf.get_u8();
        let topic_len = buf.get_u16_le();

        let end_topic = PUB_FIXED_SIZE + topic_len as usize;
        if end_topic > payload.len() {
            return Err(ProtocolError::TopicOverrun {
                end: end_topic,
                actual: payload.len(),
            });
        }

        let topic_bytes = &payload[PUB_FIXED_SIZE..end_topic];
        let topic = match std::str::from_utf8(topic_bytes) {
            Ok(topic) => topic.to_string(),
            Err(e) => {
                log::trace!("publish topic is not valid UTF-8 ({}), decoding lossily", e);
                String::from_utf8_lossy(topic_bytes).into_owned()
            }
        };

        Ok(PublishRecord {
            node_id,
            msg_type,
            version,
            topic_len,
            topic,
            data: payload[end_topic..].to_vec(),
        })
    }

    /// Length of the data payload.
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Compare the topic against `expected`, ignoring trailing NUL, space, CR
    /// and LF on the received topic.
    pub fn topic_matches(&self, expected: &str) -> bool {
        self.topic.trim_end_matches(|c: char| c == ' ' || TEXT_TERMINATORS.contains(&c)) == expected
    }

    /// The data as text with trailing NUL, CR and LF removed, if it is UTF-8.
    pub fn data_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data)
            .ok()
            .map(|text| text.trim_end_matches(TEXT_TERMINATORS))
    }
}

/// Decode a publish body, discarding the reason on failure.
pub fn parse_publish(payload: &[u8]) -> Option<PublishRecord> {
    PublishRecord::decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(node_id: u64, topic: &[u8], topic_len: u16, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&node_id.to_le_bytes());
        buf.push(0x01);
        buf.push(0x02);
        buf.extend_from_slice(&topic_len.to_le_bytes());
        buf.extend_from_slice(topic);
        buf.extend_from_slice(data);
        buf
    }

    #[test]
    fn test_decode_led_example() {
        let body = payload(0xC0FFEEEEF0CACC1A, b"device/led", 10, br#"{"led":"on"}"#);
        let record = PublishRecord::decode(&body).unwrap();

        assert_eq!(record.node_id, NodeId::new(0xC0FFEEEEF0CACC1A));
        assert_eq!(record.msg_type, 0x01);
        assert_eq!(record.version, 0x02);
        assert_eq!(record.topic_len, 10);
        assert_eq!(record.topic, "device/led");
        assert_eq!(record.data, br#"{"led":"on"}"#);
        assert_eq!(record.data_len(), 12);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(parse_publish(&[0u8; 11]), None);
        assert_eq!(
            PublishRecord::decode(&[0u8; 11]),
            Err(ProtocolError::FrameTooShort {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_empty_topic_and_data() {
        let record = parse_publish(&payload(1, b"", 0, b"")).unwrap();
        assert_eq!(record.topic, "");
        assert!(record.data.is_empty());
    }

    #[test]
    fn test_topic_overrun() {
        let body = payload(1, b"abc", 10, b"");
        assert_eq!(parse_publish(&body), None);
        assert_eq!(
            PublishRecord::decode(&body),
            Err(ProtocolError::TopicOverrun { end: 22, actual: 15 })
        );
    }

    #[test]
    fn test_invalid_utf8_topic_is_lossy() {
        let body = payload(1, &[b'a', 0xFF, b'b'], 3, b"xyz");
        let record = parse_publish(&body).unwrap();
        assert_eq!(record.topic, "a\u{FFFD}b");
        assert_eq!(record.topic_len, 3);
        assert_eq!(record.data, b"xyz");
    }

    #[test]
    fn test_binary_data_passes_through() {
        let data = [0x00, 0xFF, 0x80, 0x00];
        let record = parse_publish(&payload(1, b"t", 1, &data)).unwrap();
        assert_eq!(record.data, data);
        assert_eq!(record.data_text(), None);
    }

    #[test]
    fn test_topic_matches_tolerates_terminators() {
        let record = parse_publish(&payload(1, b"device/led\0\r\n ", 14, b"")).unwrap();
        assert!(record.topic_matches("device/led"));
        assert!(!record.topic_matches("device/le"));
        assert!(!record.topic_matches("device/led/x"));
    }

    #[test]
    fn test_data_text() {
        let record = parse_publish(&payload(1, b"t", 1, b"hello\r\n\0")).unwrap();
        assert_eq!(record.data_text(), Some("hello"));

        let record = parse_publish(&payload(1, b"t", 1, &[0xC3, 0x28])).unwrap();
        assert_eq!(record.data_text(), None);
    }
}
