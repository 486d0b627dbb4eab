//! Station configuration.
//!
//! Loaded from YAML; every key is optional:
//!
//! ```yaml
//! name: backyard
//! variant: particulate   # basic | particulate
//! max_frame_len: 64
//! read_chunk: 64
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use ws3_protocol::{PacketVariant, DEFAULT_MAX_FRAME_LEN, MAX_FRAME_LEN, MIN_FRAME_LEN};

use crate::error::ConfigError;

/// Default number of bytes requested from the source per read.
pub const DEFAULT_READ_CHUNK: usize = 64;

/// Largest read buffer a station allocates.
pub const MAX_READ_CHUNK: usize = 4096;

/// Configuration for one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StationConfig {
    /// Station name, used in logs and metric labels.
    pub name: String,
    /// Wire variant the transmitter is jumpered for.
    pub variant: PacketVariant,
    /// Bytes the framer accepts without a terminator before resyncing.
    pub max_frame_len: usize,
    /// Bytes requested from the source per read.
    pub read_chunk: usize,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            name: "ws3".to_string(),
            variant: PacketVariant::Basic,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            read_chunk: DEFAULT_READ_CHUNK,
        }
    }
}

impl StationConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: StationConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Check limits that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_len < MIN_FRAME_LEN {
            return Err(ConfigError::FrameLimitTooSmall {
                limit: self.max_frame_len,
                required: MIN_FRAME_LEN,
            });
        }
        if self.max_frame_len > MAX_FRAME_LEN {
            return Err(ConfigError::FrameLimitTooLarge {
                limit: self.max_frame_len,
                max: MAX_FRAME_LEN,
            });
        }
        if self.read_chunk == 0 {
            return Err(ConfigError::ZeroReadChunk);
        }
        if self.read_chunk > MAX_READ_CHUNK {
            return Err(ConfigError::ReadChunkTooLarge {
                chunk: self.read_chunk,
                max: MAX_READ_CHUNK,
            });
        }
        Ok(())
    }
}
