//! WS3 Weather Station Serial Protocol
//!
//! This crate turns the ASCII byte stream of a WS3 weather-station
//! transmitter into typed [`Reading`]s.
//!
//! # Protocol Overview
//!
//! The station sends one line per measurement cycle:
//!
//! ```text
//! c000s000g000t075r000p019h43b09940*32\r\n
//! ```
//!
//! - Each measurement is a one-letter tag followed by fixed-width decimal digits
//! - `*` is followed by two hex digits: the XOR of every byte before the `*`
//! - Stations with a particulate sensor append six 3-digit particle counts
//!   before the `*`
//!
//! # Pipeline
//!
//! - [`Framer`]: splits the byte stream into lines, with a bounded buffer
//! - [`Validator`]: checks the delimiter position and checksum
//! - [`Decoder`]: extracts the fields of a validated payload
//! - [`Pipeline`]: all three, owned by one value per device
//!
//! # Example
//!
//! ```rust
//! use ws3_protocol::{PacketVariant, Pipeline};
//!
//! let mut pipeline = Pipeline::new(PacketVariant::Basic);
//! pipeline.push(b"c225s000g000t093r000p000h18b09890*35\r\n");
//!
//! for result in pipeline.by_ref() {
//!     match result {
//!         Ok(reading) => println!("{} F, {} hPa", reading.temperature_f, reading.air_pressure),
//!         Err(e) => eprintln!("dropped packet: {}", e),
//!     }
//! }
//! ```

mod checksum;
mod decode;
mod encode;
mod error;
mod framer;
pub mod layout;
mod pipeline;
mod reading;

pub use checksum::*;
pub use decode::*;
pub use encode::*;
pub use error::*;
pub use framer::*;
pub use layout::{PacketLayout, PacketVariant};
pub use pipeline::*;
pub use reading::*;
