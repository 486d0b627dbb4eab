//! WS3 Runner
//!
//! Decodes a captured WS3 byte stream (a file, stdin, or a generated demo
//! stream) and writes one JSON object per packet.
//!
//! ```text
//! ws3 --input capture.bin --variant particulate --show-errors
//! ws3 --demo 20 --metrics-output json
//! ```

pub mod metrics_export;

use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use metrics_util::debugging::DebuggingRecorder;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use ws3_protocol::{
    encode_packet, EncodeError, PacketError, PacketVariant, ParticleCounts, Reading,
};
use ws3_station::{
    ConfigError, ReaderSource, Station, StationConfig, StationError, StationStats,
};

use crate::metrics_export::MetricsExport;

/// Command-line arguments for the `ws3` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "ws3")]
#[command(about = "Decode WS3 weather station serial captures to JSON")]
pub struct Args {
    /// YAML station configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Capture file to decode, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Wire variant (overrides the configuration)
    #[arg(long, value_enum)]
    pub variant: Option<VariantArg>,

    /// Station name used in logs and metric labels (overrides the configuration)
    #[arg(long)]
    pub name: Option<String>,

    /// Frame limit in bytes (overrides the configuration)
    #[arg(long)]
    pub max_frame_len: Option<usize>,

    /// Decode a generated stream of this many packets instead of reading input
    #[arg(long, value_name = "PACKETS")]
    pub demo: Option<usize>,

    /// Also print rejected packets
    #[arg(long)]
    pub show_errors: bool,

    /// Print a metrics summary after the stream ends
    #[arg(long, value_enum)]
    pub metrics_output: Option<MetricsOutput>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Wire variant as a command-line value.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantArg {
    /// Weather fields only.
    Basic,
    /// Weather fields plus six particle counts.
    Particulate,
}

/// Format of the end-of-run metrics summary.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsOutput {
    /// One JSON object on its own line after the readings.
    Json,
}

impl From<VariantArg> for PacketVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Basic => PacketVariant::Basic,
            VariantArg::Particulate => PacketVariant::Particulate,
        }
    }
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The configuration file or an override is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The station failed to start or to read its source.
    #[error(transparent)]
    Station(#[from] StationError),

    /// The capture file could not be opened.
    #[error("cannot open input {path}: {source}")]
    Input {
        /// Path given on the command line.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing output failed.
    #[error("write failed: {0}")]
    Output(#[from] io::Error),

    /// A record could not be serialized.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The demo stream could not be encoded.
    #[error("demo stream generation failed: {0}")]
    Demo(#[from] EncodeError),
}

/// One line of output.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Record<'a> {
    /// A decoded packet.
    Accepted {
        /// Station name.
        station: &'a str,
        /// The decoded values.
        reading: &'a Reading,
    },
    /// A discarded packet.
    Rejected {
        /// Station name.
        station: &'a str,
        /// Failure kind, as used in the `reason` metric label.
        reason: &'static str,
        /// Human-readable error.
        error: String,
    },
}

impl<'a> Record<'a> {
    fn from_result(station: &'a str, result: &'a Result<Reading, PacketError>) -> Self {
        match result {
            Ok(reading) => Record::Accepted { station, reading },
            Err(e) => Record::Rejected {
                station,
                reason: e.kind(),
                error: e.to_string(),
            },
        }
    }
}

/// Resolve the station configuration from the file and command-line overrides.
pub fn load_config(args: &Args) -> Result<StationConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => {
            info!(path = ?path, "Loading configuration");
            StationConfig::from_file(path)?
        }
        None => StationConfig::default(),
    };
    if let Some(variant) = args.variant {
        config.variant = variant.into();
    }
    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    if let Some(limit) = args.max_frame_len {
        config.max_frame_len = limit;
    }
    config.validate()?;
    Ok(config)
}

/// Generate `packets` encoded packets with varying values.
///
/// Every seventh packet has its checksum corrupted and every eleventh is
/// preceded by a burst of line noise, so a demo run exercises both the
/// rejection and the resync paths.
pub fn demo_stream(variant: PacketVariant, packets: usize) -> Result<Vec<u8>, EncodeError> {
    let mut stream = Vec::new();
    for i in 0..packets {
        let step = (i % 1000) as u16;
        let reading = Reading {
            wind_direction: ((i * 45) % 360) as u16,
            wind_speed: step % 25,
            wind_speed_peak_5m: step % 25 + 5,
            temperature_f: 60 + (i % 30) as i16,
            rain_1h: (i % 4) as f32 * 0.01,
            rain_24h: (i % 20) as f32 * 0.01,
            humidity: 40 + (i % 50) as u8,
            air_pressure: 1000.0 + (i % 30) as f32 * 0.5,
            particulates: match variant {
                PacketVariant::Basic => None,
                PacketVariant::Particulate => Some(ParticleCounts::from_array([
                    50 + step % 10,
                    90,
                    100,
                    400 + step % 100,
                    60,
                    70,
                ])),
            },
        };

        if i % 11 == 10 {
            stream.extend_from_slice(&[b'~'; 80]);
            stream.extend_from_slice(b"\r\n");
        }
        let mut packet = encode_packet(variant, &reading)?;
        if i % 7 == 6 {
            // Corrupt the high checksum digit.
            let at = variant.layout().delimiter_offset + 1;
            packet[at] = if packet[at] == b'0' { b'1' } else { b'0' };
        }
        stream.extend(packet);
    }
    Ok(stream)
}

fn open_input(args: &Args, variant: PacketVariant) -> Result<Box<dyn Read>, RunnerError> {
    if let Some(packets) = args.demo {
        info!(packets, %variant, "Decoding generated demo stream");
        return Ok(Box::new(Cursor::new(demo_stream(variant, packets)?)));
    }
    if args.input == "-" {
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(&args.input).map_err(|source| RunnerError::Input {
        path: args.input.clone(),
        source,
    })?;
    Ok(Box::new(file))
}

/// Decode the configured input to completion, writing JSON lines to `out`.
///
/// With `--metrics-output json` the counters emitted during the run are
/// captured and written as a final `{"metrics": ...}` line.
pub fn run(args: &Args, out: &mut impl Write) -> Result<StationStats, RunnerError> {
    let Some(MetricsOutput::Json) = args.metrics_output else {
        return decode_stream(args, out);
    };

    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let stats = metrics::with_local_recorder(&recorder, || {
        ws3_metrics::describe_metrics();
        decode_stream(args, &mut *out)
    })?;

    let export = MetricsExport::from_snapshot(snapshotter.snapshot());
    serde_json::to_writer(&mut *out, &export)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(stats)
}

fn decode_stream(args: &Args, out: &mut impl Write) -> Result<StationStats, RunnerError> {
    let config = load_config(args)?;
    let input = open_input(args, config.variant)?;
    let mut station = Station::new(config, ReaderSource::new(input))?;

    while !station.is_exhausted() {
        let outcome = station.poll()?;
        for result in &outcome.results {
            if result.is_err() && !args.show_errors {
                continue;
            }
            let record = Record::from_result(&station.config().name, result);
            serde_json::to_writer(&mut *out, &record)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;

    let stats = station.stats().clone();
    info!(
        accepted = stats.packets_accepted,
        rejected = stats.packets_rejected,
        overflows = stats.framer_overflows,
        bytes = stats.bytes_received,
        "Stream finished"
    );
    Ok(stats)
}
