//! Frame checksum.
//!
//! A byte-wise 16-bit CRC (reflected CCITT polynomial, no final XOR). The
//! peer computes the same value over each frame with the two checksum bytes
//! zeroed, so the update step must stay bit-exact.

/// Compute the 16-bit checksum of `bytes`, starting from `seed`.
///
/// Frames are checksummed with a seed of `0`.
pub fn checksum(seed: u16, bytes: &[u8]) -> u16 {
    bytes.iter().fold(seed, |crc, &byte| {
        let e = (crc ^ u16::from(byte)) & 0xFF;
        let f = e ^ ((e << 4) & 0xFF);
        (crc >> 8) ^ (f << 8) ^ (f << 3) ^ (f >> 4)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_returns_seed() {
        assert_eq!(checksum(0, b""), 0);
        assert_eq!(checksum(0xBEEF, b""), 0xBEEF);
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(checksum(0, &[0x01]), 0x1189);
        assert_eq!(checksum(0, &[0x00]), 0x0000);
        assert_eq!(checksum(0, b"123456789"), 0x2189);
        assert_eq!(checksum(0xFFFF, b"123456789"), 0x6F91);
        assert_eq!(checksum(0x1234, b"hello"), 0xF8DC);
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(checksum(0, b"ab"), checksum(0, b"ba"));
    }

    #[test]
    fn test_subscribe_header_vector() {
        // SUB "device/led" with checksum bytes zeroed
        let mut frame = vec![0x03, 0x00, 0x00, 0x00, 0x0A, 0x00];
        frame.extend_from_slice(b"device/led");
        assert_eq!(checksum(0, &frame), 0x63B2);
    }
}
