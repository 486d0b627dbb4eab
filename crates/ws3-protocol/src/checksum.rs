//! Checksum validation.
//!
//! The station terminates the payload with `*` followed by two hex digits
//! holding the XOR of every payload byte:
//!
//! ```text
//! c000s000g000t075r000p019h43b09940*32
//! |------------ payload ----------|
//! ```

use bytes::Bytes;

use crate::error::FrameError;
use crate::framer::Packet;
use crate::layout::{PacketLayout, PacketVariant, CHECKSUM_DIGITS, DELIMITER};

/// XOR of every byte, starting from zero.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &byte| acc ^ byte)
}

/// A packet's payload whose checksum has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Bytes,
}

impl Payload {
    /// Payload bytes, delimiter excluded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Wrap bytes without checking anything. Decoder tests use this to reach
    /// field errors that a real checksum would mask.
    #[cfg(test)]
    pub(crate) fn unchecked(bytes: &[u8]) -> Self {
        Payload {
            bytes: Bytes::copy_from_slice(bytes),
        }
    }
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

/// Checks the delimiter position and checksum of packets for one variant.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    layout: &'static PacketLayout,
}

impl Validator {
    /// Create a validator for the given variant.
    pub fn new(variant: PacketVariant) -> Self {
        Validator {
            layout: variant.layout(),
        }
    }

    /// Offset at which the delimiter is expected.
    pub fn delimiter_offset(&self) -> usize {
        self.layout.delimiter_offset
    }

    /// Verify `packet` and return its payload.
    pub fn validate(&self, packet: &Packet) -> Result<Payload, FrameError> {
        let bytes = packet.as_bytes();
        let offset = self.layout.delimiter_offset;

        if bytes.get(offset) != Some(&DELIMITER) {
            return Err(FrameError::MissingDelimiter {
                offset,
                packet: bytes.to_vec(),
            });
        }

        let digits_end = (offset + 1 + CHECKSUM_DIGITS).min(bytes.len());
        let digits = &bytes[offset + 1..digits_end];
        let expected = parse_hex_byte(digits).ok_or_else(|| FrameError::MalformedChecksum {
            digits: digits.to_vec(),
        })?;

        let computed = checksum(&bytes[..offset]);
        if computed != expected {
            return Err(FrameError::ChecksumMismatch { expected, computed });
        }

        Ok(Payload {
            bytes: packet.slice(0..offset),
        })
    }
}

/// Parse exactly two hex digits, either case.
fn parse_hex_byte(digits: &[u8]) -> Option<u8> {
    match digits {
        [hi, lo] => {
            let hi = (*hi as char).to_digit(16)?;
            let lo = (*lo as char).to_digit(16)?;
            Some((hi << 4 | lo) as u8)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &[u8] = b"c000s000g000t075r000p019h43b09940*32";

    #[test]
    fn test_checksum_fold() {
        assert_eq!(checksum(b""), 0);
        assert_eq!(checksum(b"A"), b'A');
        assert_eq!(checksum(b"AA"), 0);
        assert_eq!(checksum(b"c000s000g000t075r000p019h43b09940"), 0x32);
    }

    #[test]
    fn test_accepts_valid_packet() {
        let validator = Validator::new(PacketVariant::Basic);
        let payload = validator.validate(&Packet::from(GOOD)).expect("valid packet");
        assert_eq!(payload.as_bytes(), &GOOD[..33]);
    }

    #[test]
    fn test_lowercase_hex_accepted() {
        let validator = Validator::new(PacketVariant::Basic);
        // XOR of this payload is 0x3B.
        let packet = b"c000s000g000t075r000p019h43b09949*3b";
        assert_eq!(checksum(&packet[..33]), 0x3b);
        assert!(validator.validate(&Packet::from(&packet[..])).is_ok());
    }

    #[test]
    fn test_flipped_byte_rejected() {
        let validator = Validator::new(PacketVariant::Basic);
        for i in 0..33 {
            let mut corrupted = GOOD.to_vec();
            corrupted[i] ^= 0x01;
            let err = validator
                .validate(&Packet::from(&corrupted[..]))
                .expect_err("corrupted packet must be rejected");
            assert!(
                matches!(err, FrameError::ChecksumMismatch { expected: 0x32, .. }),
                "byte {} gave {:?}",
                i,
                err
            );
        }
    }

    #[test]
    fn test_missing_delimiter() {
        let validator = Validator::new(PacketVariant::Basic);
        let err = validator
            .validate(&Packet::from(&b"c000s000g000t075r000p019h43b099400*32"[..]))
            .unwrap_err();
        assert!(matches!(err, FrameError::MissingDelimiter { offset: 33, .. }));

        let err = validator.validate(&Packet::from(&b"garbage"[..])).unwrap_err();
        assert_eq!(
            err,
            FrameError::MissingDelimiter {
                offset: 33,
                packet: b"garbage".to_vec()
            }
        );
    }

    #[test]
    fn test_particulate_layout_expects_later_delimiter() {
        let validator = Validator::new(PacketVariant::Particulate);
        assert_eq!(validator.delimiter_offset(), 58);
        let err = validator.validate(&Packet::from(GOOD)).unwrap_err();
        assert!(matches!(err, FrameError::MissingDelimiter { offset: 58, .. }));
    }

    #[test]
    fn test_malformed_checksum() {
        let validator = Validator::new(PacketVariant::Basic);

        let err = validator
            .validate(&Packet::from(&b"c000s000g000t075r000p019h43b09940*3G"[..]))
            .unwrap_err();
        assert_eq!(err, FrameError::MalformedChecksum { digits: b"3G".to_vec() });

        let err = validator
            .validate(&Packet::from(&b"c000s000g000t075r000p019h43b09940*3"[..]))
            .unwrap_err();
        assert_eq!(err, FrameError::MalformedChecksum { digits: b"3".to_vec() });

        // A sign is not a hex digit.
        let err = validator
            .validate(&Packet::from(&b"c000s000g000t075r000p019h43b09940*+2"[..]))
            .unwrap_err();
        assert!(matches!(err, FrameError::MalformedChecksum { .. }));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let validator = Validator::new(PacketVariant::Basic);
        let mut packet = GOOD.to_vec();
        packet.extend_from_slice(b"  ");
        assert!(validator.validate(&Packet::from(&packet[..])).is_ok());
    }
}
