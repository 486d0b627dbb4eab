//! Error types for the station driver.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a station configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The YAML is malformed or has the wrong shape.
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The frame limit cannot hold the longest valid packet.
    #[error("max_frame_len {limit} is too small (need at least {required})")]
    FrameLimitTooSmall {
        /// Configured limit.
        limit: usize,
        /// Smallest workable limit.
        required: usize,
    },

    /// The frame limit exceeds the largest supported accumulator.
    #[error("max_frame_len {limit} is too large (at most {max})")]
    FrameLimitTooLarge {
        /// Configured limit.
        limit: usize,
        /// Largest workable limit.
        max: usize,
    },

    /// The per-poll read size must be non-zero.
    #[error("read_chunk must be greater than zero")]
    ZeroReadChunk,

    /// The per-poll read buffer is larger than allowed.
    #[error("read_chunk {chunk} is too large (at most {max})")]
    ReadChunkTooLarge {
        /// Configured chunk size.
        chunk: usize,
        /// Largest allowed chunk size.
        max: usize,
    },
}

/// Errors raised while running a station.
#[derive(Debug, Error)]
pub enum StationError {
    /// Reading from the byte source failed.
    #[error("serial read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for station operations.
pub type StationResult<T> = Result<T, StationError>;
