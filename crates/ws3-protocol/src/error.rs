//! Error types for the WS3 protocol.
//!
//! Every error here is scoped to a single packet. A caller that receives one
//! discards the packet and keeps feeding the pipeline.

use thiserror::Error;

use crate::layout::Field;

/// Errors raised while validating the framing and checksum of a packet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The checksum delimiter was not found at the offset the layout expects.
    #[error("no '*' at offset {offset} in packet [{}]", String::from_utf8_lossy(.packet))]
    MissingDelimiter {
        /// Offset where the delimiter was expected.
        offset: usize,
        /// The raw packet, kept for diagnostics.
        packet: Vec<u8>,
    },

    /// The two bytes after the delimiter are missing or not hex digits.
    #[error("malformed checksum digits {:?}", String::from_utf8_lossy(.digits))]
    MalformedChecksum {
        /// Whatever followed the delimiter (at most two bytes).
        digits: Vec<u8>,
    },

    /// The transmitted checksum does not match the payload.
    #[error("checksum mismatch: transmitted 0x{expected:02X}, calculated 0x{computed:02X}")]
    ChecksumMismatch {
        /// Checksum transmitted by the station.
        expected: u8,
        /// XOR of the received payload.
        computed: u8,
    },
}

/// Errors raised while decoding the fields of a validated payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A tagged field is absent from the payload.
    #[error("tag '{0}' not found in payload")]
    TagNotFound(char),

    /// A tagged field is present but its digits are not a decimal numeral.
    #[error("invalid numeral after tag '{0}'")]
    InvalidNumeral(char),

    /// The payload ends before a tagged field's digits do.
    #[error("field '{tag}' truncated: need {width} digits, {available} available")]
    Truncated {
        /// Tag of the truncated field.
        tag: char,
        /// Digits the field requires.
        width: usize,
        /// Bytes left in the payload after the tag.
        available: usize,
    },

    /// A particle count slot holds something other than digits.
    #[error("invalid particle count #{index} at offset {offset}")]
    InvalidCount {
        /// Bin index (0 = 0.3um).
        index: usize,
        /// Absolute payload offset of the slot.
        offset: usize,
    },

    /// The payload is too short to contain a particle count slot.
    #[error("particle count #{index} at offset {offset} lies outside the payload")]
    CountOutOfBounds {
        /// Bin index (0 = 0.3um).
        index: usize,
        /// Absolute payload offset of the slot.
        offset: usize,
    },
}

/// Any failure of a single packet on its way through the pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// Framing or checksum failure.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Field decoding failure.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl PacketError {
    /// Short, stable label for this failure, suitable for metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            PacketError::Frame(FrameError::MissingDelimiter { .. }) => "missing_delimiter",
            PacketError::Frame(FrameError::MalformedChecksum { .. }) => "malformed_checksum",
            PacketError::Frame(FrameError::ChecksumMismatch { .. }) => "checksum_mismatch",
            PacketError::Decode(DecodeError::TagNotFound(_)) => "tag_not_found",
            PacketError::Decode(DecodeError::InvalidNumeral(_)) => "invalid_numeral",
            PacketError::Decode(DecodeError::Truncated { .. }) => "truncated",
            PacketError::Decode(DecodeError::InvalidCount { .. }) => "invalid_count",
            PacketError::Decode(DecodeError::CountOutOfBounds { .. }) => "count_out_of_bounds",
        }
    }

    /// Whether the packet failed before its checksum was accepted.
    pub fn is_frame_error(&self) -> bool {
        matches!(self, PacketError::Frame(_))
    }
}

/// Errors raised when rendering a reading back onto the wire.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    /// A value does not fit in its field's digit width.
    #[error("{field} value {value} does not fit the wire format")]
    ValueOutOfRange {
        /// The offending field.
        field: Field,
        /// The value as given.
        value: f64,
    },

    /// A particle count does not fit in its slot.
    #[error("particle count #{index} value {value} does not fit the wire format")]
    CountOutOfRange {
        /// Bin index (0 = 0.3um).
        index: usize,
        /// The count as given.
        value: u16,
    },

    /// The layout carries particle counts but the reading has none.
    #[error("layout requires particle counts but the reading has none")]
    MissingParticulates,
}

/// Result type alias for packet operations.
pub type Ws3Result<T> = Result<T, PacketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::ChecksumMismatch {
            expected: 0x32,
            computed: 0x3d,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: transmitted 0x32, calculated 0x3D"
        );

        let err = FrameError::MissingDelimiter {
            offset: 33,
            packet: b"c000s000".to_vec(),
        };
        assert!(err.to_string().contains("offset 33"));
        assert!(err.to_string().contains("c000s000"));

        let err = DecodeError::TagNotFound('h');
        assert_eq!(err.to_string(), "tag 'h' not found in payload");
    }

    #[test]
    fn test_packet_error_kind() {
        let err: PacketError = DecodeError::InvalidNumeral('b').into();
        assert_eq!(err.kind(), "invalid_numeral");
        assert!(!err.is_frame_error());

        let err: PacketError = FrameError::MalformedChecksum { digits: b"zz".to_vec() }.into();
        assert_eq!(err.kind(), "malformed_checksum");
        assert!(err.is_frame_error());
    }
}
