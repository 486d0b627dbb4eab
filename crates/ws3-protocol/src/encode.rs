//! Packet encoding.
//!
//! Renders a [`Reading`] the way the station would send it. Used to build
//! synthetic streams for tests, benchmarks and the runner's demo mode.

use crate::checksum::checksum;
use crate::error::EncodeError;
use crate::layout::{Field, PacketVariant, TaggedField, DELIMITER};
use crate::reading::Reading;

/// Encode `reading` as one full line: payload, `*`, checksum, `\r\n`.
pub fn encode_packet(variant: PacketVariant, reading: &Reading) -> Result<Vec<u8>, EncodeError> {
    let mut buf = encode_payload(variant, reading)?;
    let sum = checksum(&buf);
    buf.push(DELIMITER);
    buf.extend_from_slice(format!("{:02X}", sum).as_bytes());
    buf.extend_from_slice(b"\r\n");
    Ok(buf)
}

/// Encode only the payload (everything before the delimiter).
pub fn encode_payload(variant: PacketVariant, reading: &Reading) -> Result<Vec<u8>, EncodeError> {
    let layout = variant.layout();
    let mut buf = Vec::with_capacity(layout.packet_len() + 2);

    for tagged in layout.fields {
        let raw = raw_value(tagged, field_value(reading, tagged.field))?;
        buf.push(tagged.tag);
        buf.extend_from_slice(format!("{:0width$}", raw, width = tagged.width).as_bytes());
    }

    if let Some(block) = &layout.particulates {
        let counts = reading
            .particulates
            .ok_or(EncodeError::MissingParticulates)?
            .to_array();
        for (index, &value) in counts.iter().enumerate().take(block.count) {
            if u32::from(value) >= 10u32.pow(block.width as u32) {
                return Err(EncodeError::CountOutOfRange { index, value });
            }
            buf.push(block.separator);
            buf.extend_from_slice(format!("{:0width$}", value, width = block.width).as_bytes());
        }
        buf.push(block.separator);
    }

    debug_assert_eq!(buf.len(), layout.delimiter_offset);
    Ok(buf)
}

fn field_value(reading: &Reading, field: Field) -> f64 {
    match field {
        Field::WindDirection => reading.wind_direction as f64,
        Field::WindSpeed => reading.wind_speed as f64,
        Field::WindSpeedPeak5m => reading.wind_speed_peak_5m as f64,
        Field::Temperature => reading.temperature_f as f64,
        Field::Rain1h => reading.rain_1h as f64,
        Field::Rain24h => reading.rain_24h as f64,
        Field::Humidity => reading.humidity as f64,
        Field::AirPressure => reading.air_pressure as f64,
    }
}

fn raw_value(tagged: &TaggedField, value: f64) -> Result<u32, EncodeError> {
    let raw = (value / tagged.scale as f64).round();
    if !raw.is_finite() || raw < 0.0 || raw > tagged.max_raw() as f64 {
        return Err(EncodeError::ValueOutOfRange {
            field: tagged.field,
            value,
        });
    }
    Ok(raw as u32)
}
