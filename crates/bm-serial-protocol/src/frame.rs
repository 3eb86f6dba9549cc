//! Frame header, outbound finalization and inbound classification.
//!
//! Every frame shares the same 4-byte header:
//!
//! ```text
//! +------+----------+-------------+-------------+
//! | type | reserved | checksum_lo | checksum_hi |
//! +------+----------+-------------+-------------+
//! ```

use crate::checksum::checksum;
use crate::cobs::stuff;
use crate::constants::{FRAME_DELIMITER, FRAME_HEADER_SIZE};
use crate::error::{ProtocolError, ProtocolResult};
use crate::publish::PublishRecord;
use crate::types::MessageType;

/// Byte range of the checksum inside the header.
const CHECKSUM_RANGE: std::ops::Range<usize> = 2..4;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Raw message type byte.
    pub message_type: u8,
    /// Reserved byte (always zero on outbound frames).
    pub reserved: u8,
    /// Checksum carried in the frame.
    pub checksum: u16,
}

impl FrameHeader {
    /// Create a header for an outbound frame with an empty checksum.
    pub fn new(message_type: MessageType) -> Self {
        FrameHeader {
            message_type: message_type.code(),
            reserved: 0,
            checksum: 0,
        }
    }

    /// Parse the header at the start of `frame`.
    pub fn parse(frame: &[u8]) -> ProtocolResult<Self> {
        if frame.len() < FRAME_HEADER_SIZE {
            return Err(ProtocolError::FrameTooShort {
                expected: FRAME_HEADER_SIZE,
                actual: frame.len(),
            });
        }

        Ok(FrameHeader {
            message_type: frame[0],
            reserved: frame[1],
            checksum: u16::from_le_bytes([frame[2], frame[3]]),
        })
    }

    /// Wire encoding of the header.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let [lo, hi] = self.checksum.to_le_bytes();
        [self.message_type, self.reserved, lo, hi]
    }
}

/// Compute the checksum of an unstuffed frame with its checksum field zeroed.
///
/// Returns `None` if the frame is shorter than a header.
pub fn frame_checksum(frame: &[u8]) -> Option<u16> {
    if frame.len() < FRAME_HEADER_SIZE {
        return None;
    }
    let crc = checksum(0, &frame[..CHECKSUM_RANGE.start]);
    let crc = checksum(crc, &[0, 0]);
    Some(checksum(crc, &frame[CHECKSUM_RANGE.end..]))
}

/// Check whether the checksum embedded in an unstuffed frame is correct.
pub fn checksum_matches(frame: &[u8]) -> bool {
    match (FrameHeader::parse(frame), frame_checksum(frame)) {
        (Ok(header), Some(expected)) => header.checksum == expected,
        _ => false,
    }
}

/// Write the checksum into `frame[2..4]`.
///
/// The frame must already contain a full header; the checksum field is
/// overwritten, so its previous value does not matter.
pub fn seal(frame: &mut [u8]) -> ProtocolResult<u16> {
    let crc = frame_checksum(frame).ok_or(ProtocolError::FrameTooShort {
        expected: FRAME_HEADER_SIZE,
        actual: frame.len(),
    })?;
    frame[CHECKSUM_RANGE].copy_from_slice(&crc.to_le_bytes());
    Ok(crc)
}

/// Finish an outbound frame: checksum, stuff, and append the delimiter.
pub fn finalize(mut frame: Vec<u8>) -> ProtocolResult<Vec<u8>> {
    seal(&mut frame)?;
    let mut wire = stuff(&frame);
    wire.push(FRAME_DELIMITER);
    Ok(wire)
}

/// A raw inbound frame after header validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A publish with a well-formed body.
    Publish(PublishRecord),
    /// A recognized message type the host does not consume.
    Other {
        /// Message type from the header.
        message_type: MessageType,
        /// Bytes after the header.
        body: Vec<u8>,
    },
}

impl InboundFrame {
    /// Validate the header of a raw burst and decode it.
    ///
    /// Errors mean the frame should be discarded; none of them are fatal.
    pub fn classify(frame: &[u8]) -> ProtocolResult<Self> {
        let header = FrameHeader::parse(frame)?;
        let message_type = MessageType::try_from(header.message_type)?;
        let body = &frame[FRAME_HEADER_SIZE..];

        match message_type {
            MessageType::Publish => Ok(InboundFrame::Publish(PublishRecord::decode(body)?)),
            _ => Ok(InboundFrame::Other {
                message_type,
                body: body.to_vec(),
            }),
        }
    }

    /// Message type of this frame.
    pub fn message_type(&self) -> MessageType {
        match self {
            InboundFrame::Publish(_) => MessageType::Publish,
            InboundFrame::Other { message_type, .. } => *message_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeId;

    fn publish_frame(topic: &str, data: &[u8]) -> Vec<u8> {
        let mut frame = vec![0x02, 0x00, 0x00, 0x00];
        frame.extend_from_slice(&NodeId::new(7).to_le_bytes());
        frame.extend_from_slice(&[0x01, 0x01]);
        frame.extend_from_slice(&(topic.len() as u16).to_le_bytes());
        frame.extend_from_slice(topic.as_bytes());
        frame.extend_from_slice(data);
        frame
    }

    #[test]
    fn test_header_parse() {
        let header = FrameHeader::parse(&[0x02, 0x00, 0xB2, 0x63, 0xFF]).unwrap();
        assert_eq!(header.message_type, 0x02);
        assert_eq!(header.reserved, 0x00);
        assert_eq!(header.checksum, 0x63B2);
        assert_eq!(header.to_bytes(), [0x02, 0x00, 0xB2, 0x63]);
    }

    #[test]
    fn test_header_too_short() {
        assert_eq!(
            FrameHeader::parse(&[0x02, 0x00, 0x00]),
            Err(ProtocolError::FrameTooShort {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_seal_ignores_existing_checksum() {
        let mut a = vec![0x03, 0x00, 0x00, 0x00, 0x01, 0x00, b'x'];
        let mut b = vec![0x03, 0x00, 0xAA, 0x55, 0x01, 0x00, b'x'];
        assert_eq!(seal(&mut a).unwrap(), seal(&mut b).unwrap());
        assert_eq!(a, b);
        assert!(checksum_matches(&a));
    }

    #[test]
    fn test_finalize_subscribe_vector() {
        let mut frame = vec![0x03, 0x00, 0x00, 0x00, 0x0A, 0x00];
        frame.extend_from_slice(b"device/led");
        let wire = finalize(frame).unwrap();

        let mut expected = vec![0x02, 0x03, 0x04, 0xB2, 0x63, 0x0A, 0x0B];
        expected.extend_from_slice(b"device/led");
        expected.push(0x00);
        assert_eq!(wire, expected);
    }

    #[test]
    fn test_finalize_is_stuffed_frame_plus_delimiter() {
        let mut frame = vec![0x02, 0x00, 0x00, 0x00];
        frame.extend((1..=300).map(|i| (i % 255 + 1) as u8));
        let mut sealed = frame.clone();
        seal(&mut sealed).unwrap();

        let wire = finalize(frame).unwrap();
        let stuffed = stuff(&sealed);
        assert_eq!(&wire[..stuffed.len()], &stuffed[..]);
        assert_eq!(wire.len(), stuffed.len() + 1);
        assert_eq!(wire.last(), Some(&FRAME_DELIMITER));
        assert_eq!(wire.iter().filter(|&&b| b == FRAME_DELIMITER).count(), 1);
    }

    #[test]
    fn test_classify_publish() {
        let frame = publish_frame("device/led", b"on");
        match InboundFrame::classify(&frame).unwrap() {
            InboundFrame::Publish(record) => {
                assert_eq!(record.node_id, NodeId::new(7));
                assert_eq!(record.topic, "device/led");
                assert_eq!(record.data, b"on");
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_classify_other_and_unknown() {
        let frame = InboundFrame::classify(&[0x01, 0x00, 0x00, 0x00, 0x42]).unwrap();
        assert_eq!(frame.message_type(), MessageType::Ack);
        assert_eq!(
            frame,
            InboundFrame::Other {
                message_type: MessageType::Ack,
                body: vec![0x42]
            }
        );

        assert_eq!(
            InboundFrame::classify(&[0xEE, 0x00, 0x00, 0x00]),
            Err(ProtocolError::UnknownMessageType(0xEE))
        );
    }

    #[test]
    fn test_classify_truncated_publish() {
        let frame = [0x02, 0x00, 0x00, 0x00, 0x01, 0x02];
        assert!(matches!(
            InboundFrame::classify(&frame),
            Err(ProtocolError::FrameTooShort { expected: 12, actual: 2 })
        ));
    }
}
