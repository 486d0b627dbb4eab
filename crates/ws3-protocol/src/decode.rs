//! Field decoding for validated payloads.
//!
//! Weather fields are found by scanning for their tag character, because
//! transmitters from different vendors do not agree on exact field offsets.
//! Particle counts carry no tags and are read at fixed payload offsets.

use crate::checksum::Payload;
use crate::error::DecodeError;
use crate::layout::{Field, PacketLayout, PacketVariant, ParticulateBlock, TaggedField};
use crate::reading::{ParticleCounts, Reading};

/// Turns validated payloads into [`Reading`]s for one variant.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    layout: &'static PacketLayout,
}

impl Decoder {
    /// Create a decoder for the given variant.
    pub fn new(variant: PacketVariant) -> Self {
        Decoder {
            layout: variant.layout(),
        }
    }

    /// Decode every field of `payload`, stopping at the first failure.
    pub fn decode(&self, payload: &Payload) -> Result<Reading, DecodeError> {
        let bytes = payload.as_bytes();
        let mut reading = Reading::default();

        // Widths are at most five digits, so the integer casts cannot truncate.
        for tagged in self.layout.fields {
            let raw = read_tagged(bytes, tagged)?;
            match tagged.field {
                Field::WindDirection => reading.wind_direction = raw as u16,
                Field::WindSpeed => reading.wind_speed = raw as u16,
                Field::WindSpeedPeak5m => reading.wind_speed_peak_5m = raw as u16,
                Field::Temperature => reading.temperature_f = raw as i16,
                Field::Rain1h => reading.rain_1h = scale(raw, tagged.scale),
                Field::Rain24h => reading.rain_24h = scale(raw, tagged.scale),
                Field::Humidity => reading.humidity = raw as u8,
                Field::AirPressure => reading.air_pressure = scale(raw, tagged.scale),
            }
        }

        if let Some(block) = &self.layout.particulates {
            reading.particulates = Some(read_particulates(bytes, block)?);
        }

        Ok(reading)
    }
}

/// Apply a field scale to a raw integer.
///
/// Divides by the reciprocal so that, e.g., 19 hundredths becomes the `f32`
/// nearest 0.19 rather than `19 * 0.01`.
fn scale(raw: u32, scale: f32) -> f32 {
    if scale == 1.0 {
        raw as f32
    } else {
        raw as f32 / (1.0 / scale).round()
    }
}

/// Find `tagged.tag` and parse the digits that follow it.
fn read_tagged(bytes: &[u8], tagged: &TaggedField) -> Result<u32, DecodeError> {
    let tag = tagged.tag_char();
    let index = bytes
        .iter()
        .position(|&b| b == tagged.tag)
        .ok_or(DecodeError::TagNotFound(tag))?;

    let start = index + 1;
    let available = bytes.len() - start;
    if available < tagged.width {
        return Err(DecodeError::Truncated {
            tag,
            width: tagged.width,
            available,
        });
    }

    parse_decimal(&bytes[start..start + tagged.width]).ok_or(DecodeError::InvalidNumeral(tag))
}

/// Read the fixed-offset particle counts.
fn read_particulates(bytes: &[u8], block: &ParticulateBlock) -> Result<ParticleCounts, DecodeError> {
    let mut counts = [0u16; 6];
    for (index, count) in counts.iter_mut().enumerate().take(block.count) {
        let slot = block.slot(index);
        let offset = slot.start;
        let digits = bytes
            .get(slot)
            .ok_or(DecodeError::CountOutOfBounds { index, offset })?;
        let value = parse_decimal(digits).ok_or(DecodeError::InvalidCount { index, offset })?;
        *count = value as u16;
    }
    Ok(ParticleCounts::from_array(counts))
}

/// Parse ASCII decimal digits. Signs, spaces and empty input are rejected.
fn parse_decimal(digits: &[u8]) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u32, |acc, &b| {
        let digit = (b as char).to_digit(10)?;
        acc.checked_mul(10)?.checked_add(digit)
    })
}
