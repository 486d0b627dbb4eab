//! Decoded sensor readings.

use serde::{Deserialize, Serialize};

/// Particle counts per 0.1 L of air, one per size threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParticleCounts {
    /// Particles >= 0.3 um.
    pub particles_03um: u16,
    /// Particles >= 0.5 um.
    pub particles_05um: u16,
    /// Particles >= 1.0 um.
    pub particles_10um: u16,
    /// Particles >= 2.5 um.
    pub particles_25um: u16,
    /// Particles >= 5.0 um.
    pub particles_50um: u16,
    /// Particles >= 10 um.
    pub particles_100um: u16,
}

impl ParticleCounts {
    /// Channel names, in wire order.
    pub const CHANNELS: [&'static str; 6] = [
        "particles_03um",
        "particles_05um",
        "particles_10um",
        "particles_25um",
        "particles_50um",
        "particles_100um",
    ];

    /// Build from counts in wire order.
    pub fn from_array(counts: [u16; 6]) -> Self {
        let [p03, p05, p10, p25, p50, p100] = counts;
        ParticleCounts {
            particles_03um: p03,
            particles_05um: p05,
            particles_10um: p10,
            particles_25um: p25,
            particles_50um: p50,
            particles_100um: p100,
        }
    }

    /// Counts in wire order.
    pub fn to_array(&self) -> [u16; 6] {
        [
            self.particles_03um,
            self.particles_05um,
            self.particles_10um,
            self.particles_25um,
            self.particles_50um,
            self.particles_100um,
        ]
    }
}

/// One decoded WS3 packet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reading {
    /// Wind direction in degrees (0-360).
    pub wind_direction: u16,
    /// One-minute wind speed in mph.
    pub wind_speed: u16,
    /// Peak wind speed over the last five minutes in mph.
    pub wind_speed_peak_5m: u16,
    /// Temperature in degrees Fahrenheit.
    pub temperature_f: i16,
    /// Rainfall over the previous hour, inches (0.01 resolution).
    pub rain_1h: f32,
    /// Rainfall over the previous 24 hours, inches (0.01 resolution).
    pub rain_24h: f32,
    /// Relative humidity in percent (0-99).
    pub humidity: u8,
    /// Barometric pressure in hPa (0.1 resolution).
    pub air_pressure: f32,
    /// Particle counts, present only for the particulate variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particulates: Option<ParticleCounts>,
}

impl Reading {
    /// Temperature converted to degrees Celsius.
    pub fn temperature_c(&self) -> f32 {
        (self.temperature_f as f32 - 32.0) * 5.0 / 9.0
    }

    /// Every value of this reading as `(channel, value)` pairs.
    ///
    /// Weather channels come first in wire order, then the particle counts
    /// when present.
    pub fn channels(&self) -> Vec<(&'static str, f64)> {
        let mut out = vec![
            ("wind_direction", self.wind_direction as f64),
            ("wind_speed", self.wind_speed as f64),
            ("wind_speed_peak_5m", self.wind_speed_peak_5m as f64),
            ("temperature", self.temperature_f as f64),
            ("rain_1h", self.rain_1h as f64),
            ("rain_24h", self.rain_24h as f64),
            ("humidity", self.humidity as f64),
            ("air_pressure", self.air_pressure as f64),
        ];
        if let Some(counts) = &self.particulates {
            out.extend(
                ParticleCounts::CHANNELS
                    .iter()
                    .zip(counts.to_array())
                    .map(|(name, count)| (*name, count as f64)),
            );
        }
        out
    }
}
