//! Publishing of readings to named output channels.

/// Receives one value per channel when the station publishes.
///
/// Channel names are stable: `wind_direction`, `wind_speed`,
/// `wind_speed_peak_5m`, `temperature`, `rain_1h`, `rain_24h`, `humidity`,
/// `air_pressure`, and for particulate stations `particles_03um` through
/// `particles_100um`.
pub trait ReadingSink {
    /// Publish the current value of one channel.
    fn publish(&mut self, channel: &'static str, value: f64);
}

impl<F> ReadingSink for F
where
    F: FnMut(&'static str, f64),
{
    fn publish(&mut self, channel: &'static str, value: f64) {
        self(channel, value)
    }
}

/// Sink that keeps everything it was given, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    /// Every `(channel, value)` published so far.
    pub published: Vec<(&'static str, f64)>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent value published on `channel`.
    pub fn latest(&self, channel: &str) -> Option<f64> {
        self.published
            .iter()
            .rev()
            .find(|(name, _)| *name == channel)
            .map(|(_, value)| *value)
    }
}

impl ReadingSink for RecordingSink {
    fn publish(&mut self, channel: &'static str, value: f64) {
        self.published.push((channel, value));
    }
}
