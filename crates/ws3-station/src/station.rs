//! The station driver: polls a byte source, decodes and keeps the latest
//! reading.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, trace, warn};
use ws3_metrics::{metric_defs, StationLabels};
use ws3_protocol::{PacketVariant, Pipeline, Reading, Ws3Result};

use crate::config::StationConfig;
use crate::error::StationResult;
use crate::sink::ReadingSink;
use crate::source::ByteSource;

/// Running totals for one station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StationStats {
    /// Raw bytes read from the source.
    pub bytes_received: u64,
    /// Packets decoded into readings.
    pub packets_accepted: u64,
    /// Packets discarded by the validator or decoder.
    pub packets_rejected: u64,
    /// Rejections keyed by failure kind.
    pub rejected_by_reason: BTreeMap<&'static str, u64>,
    /// Partial frames discarded for exceeding the frame limit.
    pub framer_overflows: u64,
}

/// What one [`Station::poll`] produced.
#[derive(Debug, Default)]
pub struct PollOutcome {
    /// Bytes read from the source during this poll.
    pub bytes_read: usize,
    /// One entry per packet completed during this poll, in arrival order.
    pub results: Vec<Ws3Result<Reading>>,
}

impl PollOutcome {
    /// Readings decoded during this poll.
    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }
}

/// One weather station attached to one byte source.
pub struct Station<S> {
    config: StationConfig,
    source: S,
    pipeline: Pipeline,
    labels: StationLabels,
    latest: Option<Reading>,
    stats: StationStats,
    read_buf: Vec<u8>,
}

impl<S: ByteSource> Station<S> {
    /// Create a station after validating its configuration.
    ///
    /// An invalid configuration is reported as [`crate::StationError::Config`].
    pub fn new(config: StationConfig, source: S) -> StationResult<Self> {
        config.validate()?;
        debug!(
            "Station[{}]: {} variant, frame limit {}",
            config.name, config.variant, config.max_frame_len
        );
        Ok(Station {
            pipeline: Pipeline::with_max_frame_len(config.variant, config.max_frame_len),
            labels: StationLabels::new(config.name.clone(), config.variant.as_str()),
            read_buf: vec![0; config.read_chunk],
            latest: None,
            stats: StationStats::default(),
            config,
            source,
        })
    }

    /// Read whatever the source has ready and decode every completed packet.
    ///
    /// Never blocks. Packet errors are counted and returned in the outcome;
    /// only a failing source is an `Err`.
    pub fn poll(&mut self) -> StationResult<PollOutcome> {
        let mut outcome = PollOutcome::default();
        let labels = self.labels.to_labels();

        let n = self.source.read_available(&mut self.read_buf)?;
        if n > 0 {
            trace!("Station[{}]: read {} bytes", self.config.name, n);
            let overflows_before = self.pipeline.framer().overflow_count();
            self.pipeline.push(&self.read_buf[..n]);
            outcome.bytes_read = n;

            self.stats.bytes_received += n as u64;
            metrics::counter!(metric_defs::BYTES_RECEIVED.name, &labels).increment(n as u64);

            let overflows = self.pipeline.framer().overflow_count() - overflows_before;
            if overflows > 0 {
                warn!(
                    "Station[{}]: discarded {} oversized partial frame(s)",
                    self.config.name, overflows
                );
                self.stats.framer_overflows += overflows;
                metrics::counter!(metric_defs::FRAMER_OVERFLOWS.name, &labels).increment(overflows);
            }
        }

        while let Some(result) = self.pipeline.next_result() {
            match &result {
                Ok(reading) => {
                    self.stats.packets_accepted += 1;
                    metrics::counter!(metric_defs::PACKETS_ACCEPTED.name, &labels).increment(1);
                    self.latest = Some(*reading);
                }
                Err(e) => {
                    let reason = e.kind();
                    debug!("Station[{}]: dropped packet ({}): {}", self.config.name, reason, e);
                    self.stats.packets_rejected += 1;
                    *self.stats.rejected_by_reason.entry(reason).or_default() += 1;
                    let reject_labels = self.labels.with(&[("reason", reason.to_string())]);
                    metrics::counter!(metric_defs::PACKETS_REJECTED.name, &reject_labels)
                        .increment(1);
                }
            }
            outcome.results.push(result);
        }

        metrics::gauge!(metric_defs::FRAMER_BUFFERED.name, &labels)
            .set(self.pipeline.framer().buffered_len() as f64);

        Ok(outcome)
    }

    /// Poll until the source reports nothing more, collecting every result.
    ///
    /// Stops at the first empty read, so a live source returns as soon as it
    /// is drained.
    pub fn drain(&mut self) -> StationResult<Vec<Ws3Result<Reading>>> {
        let mut results = Vec::new();
        loop {
            let outcome = self.poll()?;
            let idle = outcome.bytes_read == 0;
            results.extend(outcome.results);
            if idle {
                return Ok(results);
            }
        }
    }

    /// Publish every channel of the latest reading.
    ///
    /// Returns `false` when no packet has decoded yet.
    pub fn publish(&self, sink: &mut impl ReadingSink) -> bool {
        let Some(reading) = &self.latest else {
            return false;
        };
        for (channel, value) in reading.channels() {
            sink.publish(channel, value);
        }
        true
    }

    /// Drop buffered bytes and the latest reading. Counters are kept.
    pub fn reset(&mut self) {
        debug!("Station[{}]: reset", self.config.name);
        self.pipeline.reset();
        self.latest = None;
    }

    /// The most recent successfully decoded reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.latest.as_ref()
    }

    /// Running totals since creation.
    pub fn stats(&self) -> &StationStats {
        &self.stats
    }

    /// Whether the source has ended.
    pub fn is_exhausted(&self) -> bool {
        self.source.is_exhausted()
    }

    /// The validated configuration.
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Wire variant this station decodes.
    pub fn variant(&self) -> PacketVariant {
        self.config.variant
    }

    /// Mutable access to the source, e.g. to feed a [`crate::MemorySource`].
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S> std::fmt::Debug for Station<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Station")
            .field("config", &self.config)
            .field("latest", &self.latest)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
