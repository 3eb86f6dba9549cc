//! Consistent overhead byte stuffing (COBS) for outbound frames.
//!
//! The encoder replaces every `0x00` in the input with a block length so the
//! delimiter only ever appears as the terminator the caller appends:
//!
//! ```text
//! input   11 22 00 33
//! output  03 11 22 02 33      (caller then appends 00)
//! ```
//!
//! A run of [`MAX_STUFF_RUN`] non-zero bytes is emitted as a forced `0xFF`
//! block that implies no zero. The encoded stream always ends with a length
//! byte for the final segment, even when that segment is empty.
//!
//! Only the encode direction exists. Inbound bursts are consumed raw.

use crate::constants::{FRAME_DELIMITER, MAX_STUFF_RUN};

/// Upper bound on the encoded length of `len` input bytes.
pub const fn max_stuffed_len(len: usize) -> usize {
    len + len / MAX_STUFF_RUN + 1
}

/// Byte-stuff `input` so the result contains no [`FRAME_DELIMITER`].
///
/// The returned buffer has spare capacity for the delimiter.
pub fn stuff(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(max_stuffed_len(input.len()) + 1);
    let mut search_start = 0;

    for (idx, &byte) in input.iter().enumerate() {
        if byte == FRAME_DELIMITER {
            out.push((idx - search_start + 1) as u8);
            out.extend_from_slice(&input[search_start..idx]);
            search_start = idx + 1;
        } else if idx - search_start == MAX_STUFF_RUN - 1 {
            out.push(0xFF);
            out.extend_from_slice(&input[search_start..=idx]);
            search_start = idx + 1;
        }
    }

    out.push((input.len() - search_start + 1) as u8);
    out.extend_from_slice(&input[search_start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference decoder, only used to check the encoder.
    fn unstuff(encoded: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < encoded.len() {
            let code = encoded[i] as usize;
            assert!(code != 0, "delimiter inside encoded data");
            out.extend_from_slice(&encoded[i + 1..i + code]);
            i += code;
            if code != 0xFF && i < encoded.len() {
                out.push(0);
            }
        }
        out
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(stuff(&[]), vec![0x01]);
    }

    #[test]
    fn test_embedded_delimiter() {
        assert_eq!(stuff(&[0x11, 0x22, 0x00, 0x33]), vec![0x03, 0x11, 0x22, 0x02, 0x33]);
    }

    #[test]
    fn test_all_delimiters() {
        // Three length-1 segments plus the empty final segment
        assert_eq!(stuff(&[0x00, 0x00, 0x00]), vec![0x01, 0x01, 0x01, 0x01]);
    }

    #[test]
    fn test_trailing_delimiter() {
        assert_eq!(stuff(&[0x05, 0x00]), vec![0x02, 0x05, 0x01]);
    }

    #[test]
    fn test_forced_block_then_continuation() {
        let input: Vec<u8> = (0..300).map(|i| (i % 255) as u8 + 1).collect();
        let encoded = stuff(&input);

        assert_eq!(encoded[0], 0xFF);
        assert_eq!(&encoded[1..255], &input[..254]);
        assert_eq!(encoded[255], 47);
        assert_eq!(&encoded[256..], &input[254..]);
        assert_eq!(encoded.len(), max_stuffed_len(input.len()));
        assert!(!encoded.contains(&FRAME_DELIMITER));
    }

    #[test]
    fn test_forced_block_at_end_keeps_final_length_byte() {
        let input: Vec<u8> = (1..=254).map(|i| i as u8).collect();
        let encoded = stuff(&input);

        assert_eq!(encoded.len(), 256);
        assert_eq!(encoded[0], 0xFF);
        assert_eq!(encoded[255], 0x01);
        assert_eq!(unstuff(&encoded), input);
    }

    #[test]
    fn test_output_never_contains_delimiter() {
        let input: Vec<u8> = (0..1000).map(|i| (i * 7 % 256) as u8).collect();
        let encoded = stuff(&input);

        assert!(!encoded.contains(&FRAME_DELIMITER));
        assert!(encoded.len() <= max_stuffed_len(input.len()));
        assert_eq!(unstuff(&encoded), input);
    }

    #[test]
    fn test_capacity_leaves_room_for_delimiter() {
        for len in [0, 1, 253, 254, 255, 600] {
            let input = vec![0x5A; len];
            let encoded = stuff(&input);
            assert!(encoded.capacity() > encoded.len(), "len {len}");
        }
    }
}
