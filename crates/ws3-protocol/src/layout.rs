//! Packet layouts for the two WS3 wire variants.
//!
//! Both variants share the same tagged prefix:
//!
//! ```text
//! c###s###g###t###r###p###h##b#####
//! ```
//!
//! The particulate variant appends six fixed-offset counts before the
//! delimiter:
//!
//! ```text
//! 0         1         2         3         4         5
//! 0123456789012345678901234567890123456789012345678901234567890
//! c225s000g000t093r000p000h18b09890*35
//! c225s000g000t093r000p000h18b09890,056,090,100,494,063,070,*19
//! ```

use serde::{Deserialize, Serialize};

/// Checksum delimiter byte.
pub const DELIMITER: u8 = b'*';

/// Line terminator that ends every packet.
pub const TERMINATOR: u8 = b'\n';

/// Number of hex digits carrying the checksum.
pub const CHECKSUM_DIGITS: usize = 2;

// ============================================================================
// Fields
// ============================================================================

/// A tagged measurement carried in the packet prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Wind direction in degrees.
    WindDirection,
    /// One-minute wind speed in mph.
    WindSpeed,
    /// Highest wind speed over the last five minutes in mph.
    WindSpeedPeak5m,
    /// Temperature in degrees Fahrenheit.
    Temperature,
    /// Rainfall over the previous hour in inches.
    Rain1h,
    /// Rainfall over the previous 24 hours in inches.
    Rain24h,
    /// Relative humidity in percent.
    Humidity,
    /// Barometric pressure in hPa.
    AirPressure,
}

impl Field {
    /// Returns the field name as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Field::WindDirection => "wind_direction",
            Field::WindSpeed => "wind_speed",
            Field::WindSpeedPeak5m => "wind_speed_peak_5m",
            Field::Temperature => "temperature",
            Field::Rain1h => "rain_1h",
            Field::Rain24h => "rain_24h",
            Field::Humidity => "humidity",
            Field::AirPressure => "air_pressure",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and how a tagged field is carried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedField {
    /// The field this slot carries.
    pub field: Field,
    /// Tag character preceding the digits.
    pub tag: u8,
    /// Number of decimal digits after the tag.
    pub width: usize,
    /// Factor applied to the raw integer.
    pub scale: f32,
}

impl TaggedField {
    const fn new(field: Field, tag: u8, width: usize, scale: f32) -> Self {
        Self {
            field,
            tag,
            width,
            scale,
        }
    }

    /// The tag as a `char`.
    pub fn tag_char(&self) -> char {
        self.tag as char
    }

    /// Largest raw value the field's digits can carry.
    pub fn max_raw(&self) -> u32 {
        10u32.pow(self.width as u32) - 1
    }
}

/// Tagged fields shared by both variants, in wire order.
pub const TAGGED_FIELDS: [TaggedField; 8] = [
    TaggedField::new(Field::WindDirection, b'c', 3, 1.0),
    TaggedField::new(Field::WindSpeed, b's', 3, 1.0),
    TaggedField::new(Field::WindSpeedPeak5m, b'g', 3, 1.0),
    TaggedField::new(Field::Temperature, b't', 3, 1.0),
    TaggedField::new(Field::Rain1h, b'r', 3, 0.01),
    TaggedField::new(Field::Rain24h, b'p', 3, 0.01),
    TaggedField::new(Field::Humidity, b'h', 2, 1.0),
    TaggedField::new(Field::AirPressure, b'b', 5, 0.1),
];

// ============================================================================
// Particulate Block
// ============================================================================

/// Fixed-offset block of untagged particle counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticulateBlock {
    /// Payload offset of the first count.
    pub base: usize,
    /// Distance between the starts of consecutive counts.
    pub stride: usize,
    /// Digits per count.
    pub width: usize,
    /// Number of counts.
    pub count: usize,
    /// Byte placed between counts by the sender.
    pub separator: u8,
}

impl ParticulateBlock {
    /// Payload offset range of count `index`.
    pub fn slot(&self, index: usize) -> std::ops::Range<usize> {
        let start = self.base + self.stride * index;
        start..start + self.width
    }
}

/// Particle counter block used by the particulate variant.
pub const PARTICULATE_BLOCK: ParticulateBlock = ParticulateBlock {
    base: 34,
    stride: 4,
    width: 3,
    count: 6,
    separator: b',',
};

// ============================================================================
// Layouts
// ============================================================================

/// Static description of one wire variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketLayout {
    /// Offset of the `*` delimiter; also the payload length.
    pub delimiter_offset: usize,
    /// Tagged fields, in wire order.
    pub fields: &'static [TaggedField],
    /// Fixed-offset particle counts, if the variant carries them.
    pub particulates: Option<ParticulateBlock>,
}

impl PacketLayout {
    /// Packet length without terminator: payload, delimiter, checksum digits.
    pub const fn packet_len(&self) -> usize {
        self.delimiter_offset + 1 + CHECKSUM_DIGITS
    }
}

/// Layout of the basic packet.
pub const BASIC_LAYOUT: PacketLayout = PacketLayout {
    delimiter_offset: 33,
    fields: &TAGGED_FIELDS,
    particulates: None,
};

/// Layout of the packet with a particulate sub-frame.
pub const PARTICULATE_LAYOUT: PacketLayout = PacketLayout {
    delimiter_offset: 58,
    fields: &TAGGED_FIELDS,
    particulates: Some(PARTICULATE_BLOCK),
};

/// Which wire variant the station transmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketVariant {
    /// Weather fields only.
    #[default]
    Basic,
    /// Weather fields followed by six particle counts.
    Particulate,
}

impl PacketVariant {
    /// The static layout for this variant.
    pub const fn layout(&self) -> &'static PacketLayout {
        match self {
            PacketVariant::Basic => &BASIC_LAYOUT,
            PacketVariant::Particulate => &PARTICULATE_LAYOUT,
        }
    }

    /// Returns the variant as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PacketVariant::Basic => "basic",
            PacketVariant::Particulate => "particulate",
        }
    }
}

impl std::fmt::Display for PacketVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
