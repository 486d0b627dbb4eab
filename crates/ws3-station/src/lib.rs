//! WS3 Station Driver
//!
//! Drives a [`ws3_protocol::Pipeline`] from a non-blocking [`ByteSource`],
//! keeps the latest reading, counts outcomes and publishes readings to a
//! [`ReadingSink`].
//!
//! # Example
//!
//! ```rust
//! use ws3_station::{MemorySource, RecordingSink, Station, StationConfig};
//!
//! let mut source = MemorySource::new();
//! source.feed(b"c225s000g000t093r000p000h18b09890*35\r\n");
//!
//! let mut station = Station::new(StationConfig::default(), source).unwrap();
//! station.poll().unwrap();
//!
//! let mut sink = RecordingSink::new();
//! assert!(station.publish(&mut sink));
//! assert_eq!(sink.latest("temperature"), Some(93.0));
//! ```

mod config;
mod error;
mod sink;
mod source;
mod station;

pub use config::*;
pub use error::*;
pub use sink::*;
pub use source::*;
pub use station::*;
