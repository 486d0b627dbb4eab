//! Metrics for the WS3 weather station driver.
//!
//! This crate declares every metric the station emits as a structured
//! [`Metric`] constant, plus the label helper used to tag them. It re-exports
//! the `metrics` crate so callers do not need a separate dependency.
//!
//! # Example
//!
//! ```rust,ignore
//! use ws3_metrics::{metric_defs, describe_metrics, StationLabels};
//!
//! // Initialize metrics descriptions at startup
//! describe_metrics();
//!
//! let labels = StationLabels::new("backyard", "basic");
//! metrics::counter!(metric_defs::PACKETS_ACCEPTED.name, &labels.to_labels()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, Unit};

/// The kind of metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// # Example
///
/// ```rust
/// use ws3_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const LINES: Metric = Metric::counter("ws3.lines")
///     .with_description("Lines seen")
///     .with_unit(Unit::Count)
///     .with_labels(&["station"]);
///
/// assert_eq!(LINES.name, "ws3.lines");
/// assert_eq!(LINES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "ws3.packets.accepted").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Counter,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new gauge metric with the given name.
    pub const fn gauge(name: &'static str) -> Self {
        Self {
            name,
            kind: MetricKind::Gauge,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Whether `key` is one of the declared label keys.
    pub fn has_label(&self, key: &str) -> bool {
        self.labels.iter().any(|label| *label == key)
    }

    /// Registers this metric's description with the metrics recorder.
    ///
    /// This should be called once at startup for each metric.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Gauge, Some(unit)) => {
                describe_gauge!(self.name, unit, self.description);
            }
            (MetricKind::Gauge, None) => {
                describe_gauge!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions for the station driver.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Labels present on every station metric.
    pub const STANDARD_LABELS: &[&str] = &["station", "variant"];

    /// Packets that passed checksum validation and decoded cleanly.
    ///
    /// Labels: station, variant
    pub const PACKETS_ACCEPTED: Metric = Metric::counter("ws3.packets.accepted")
        .with_description("Packets decoded into readings")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Packets discarded by the validator or decoder.
    ///
    /// Labels: station, variant, reason
    ///
    /// `reason` is the failure kind, e.g. `checksum_mismatch` or `tag_not_found`.
    pub const PACKETS_REJECTED: Metric = Metric::counter("ws3.packets.rejected")
        .with_description("Packets discarded because of framing, checksum or field errors")
        .with_unit(Unit::Count)
        .with_labels(&["station", "variant", "reason"]);

    /// Times the framer hit its limit without seeing a terminator.
    ///
    /// Labels: station, variant
    pub const FRAMER_OVERFLOWS: Metric = Metric::counter("ws3.framer.overflows")
        .with_description("Partial frames discarded for exceeding the frame limit")
        .with_unit(Unit::Count)
        .with_labels(STANDARD_LABELS);

    /// Raw bytes read from the serial source.
    ///
    /// Labels: station, variant
    pub const BYTES_RECEIVED: Metric = Metric::counter("ws3.bytes.received")
        .with_description("Bytes read from the serial source")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    /// Bytes sitting in the framer's partial frame after the last poll.
    ///
    /// Labels: station, variant
    pub const FRAMER_BUFFERED: Metric = Metric::gauge("ws3.framer.buffered_bytes")
        .with_description("Bytes held in the partial frame")
        .with_unit(Unit::Bytes)
        .with_labels(STANDARD_LABELS);

    /// Every metric declared above.
    pub const ALL: &[&Metric] = &[
        &PACKETS_ACCEPTED,
        &PACKETS_REJECTED,
        &FRAMER_OVERFLOWS,
        &BYTES_RECEIVED,
        &FRAMER_BUFFERED,
    ];

    /// Look up a declared metric by name.
    pub fn find(name: &str) -> Option<&'static Metric> {
        ALL.iter().copied().find(|metric| metric.name == name)
    }
}

/// Labels identifying one station.
///
/// # Example
///
/// ```rust
/// use ws3_metrics::StationLabels;
///
/// let labels = StationLabels::new("backyard", "particulate");
/// let label_vec = labels.to_labels();
/// assert!(label_vec.iter().any(|(k, v)| *k == "station" && v == "backyard"));
/// ```
#[derive(Debug, Clone)]
pub struct StationLabels {
    /// Station name from the configuration.
    pub station: String,
    /// Wire variant (basic, particulate).
    pub variant: String,
}

impl StationLabels {
    /// Creates labels for the given station and variant.
    pub fn new(station: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            variant: variant.into(),
        }
    }

    /// Converts the labels to the metrics crate label format.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        vec![
            ("station", self.station.clone()),
            ("variant", self.variant.clone()),
        ]
    }

    /// Returns labels with additional key-value pairs.
    pub fn with(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.extend_from_slice(extra);
        labels
    }
}

/// Describes all station metrics.
///
/// Call once at startup, after installing a recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_labels() {
        let labels = StationLabels::new("backyard", "basic");
        let label_vec = labels.to_labels();

        assert_eq!(label_vec.len(), 2);
        assert!(label_vec.contains(&("station", "backyard".to_string())));
        assert!(label_vec.contains(&("variant", "basic".to_string())));
    }

    #[test]
    fn test_with_extra_labels() {
        let labels = StationLabels::new("backyard", "basic");
        let extended = labels.with(&[("reason", "checksum_mismatch".to_string())]);

        assert_eq!(extended.len(), 3);
        assert_eq!(extended[2], ("reason", "checksum_mismatch".to_string()));
    }

    #[test]
    fn test_metric_defs() {
        assert_eq!(metric_defs::PACKETS_ACCEPTED.name, "ws3.packets.accepted");
        assert_eq!(metric_defs::PACKETS_ACCEPTED.kind, MetricKind::Counter);
        assert_eq!(metric_defs::FRAMER_BUFFERED.kind, MetricKind::Gauge);
        assert_eq!(metric_defs::BYTES_RECEIVED.unit, Some(Unit::Bytes));
        assert!(metric_defs::PACKETS_REJECTED.labels.contains(&"reason"));
    }

    #[test]
    fn test_find_declared_metric() {
        let rejected = metric_defs::find("ws3.packets.rejected").unwrap();
        assert!(rejected.has_label("reason"));
        assert!(!metric_defs::PACKETS_ACCEPTED.has_label("reason"));
        assert!(metric_defs::find("ws3.unknown").is_none());
    }

    #[test]
    fn test_all_metrics_unique() {
        let mut names: Vec<_> = metric_defs::ALL.iter().map(|m| m.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
    }

    #[test]
    fn test_describe_without_recorder() {
        // No recorder installed: describing is a no-op and must not panic.
        describe_metrics();
    }
}
