//! The framer, validator and decoder wired together.

use tracing::{debug, trace};

use crate::checksum::Validator;
use crate::decode::Decoder;
use crate::error::{PacketError, Ws3Result};
use crate::framer::{Framer, Packet, DEFAULT_MAX_FRAME_LEN};
use crate::layout::PacketVariant;
use crate::reading::Reading;

/// One device's decoding state.
///
/// Owns every buffer involved; nothing is shared between pipelines.
///
/// ```rust
/// use ws3_protocol::{PacketVariant, Pipeline};
///
/// let mut pipeline = Pipeline::new(PacketVariant::Basic);
/// pipeline.push(b"c000s000g000t075r000p019h43b09940*32\r\n");
///
/// let reading = pipeline.next_result().unwrap().unwrap();
/// assert_eq!(reading.temperature_f, 75);
/// ```
#[derive(Debug)]
pub struct Pipeline {
    variant: PacketVariant,
    framer: Framer,
    validator: Validator,
    decoder: Decoder,
}

impl Pipeline {
    /// Create a pipeline with the default frame limit.
    pub fn new(variant: PacketVariant) -> Self {
        Self::with_max_frame_len(variant, DEFAULT_MAX_FRAME_LEN)
    }

    /// Create a pipeline whose framer overflows after `max_frame_len` bytes.
    pub fn with_max_frame_len(variant: PacketVariant, max_frame_len: usize) -> Self {
        Pipeline {
            variant,
            framer: Framer::with_max_frame_len(max_frame_len),
            validator: Validator::new(variant),
            decoder: Decoder::new(variant),
        }
    }

    /// The variant this pipeline decodes.
    pub fn variant(&self) -> PacketVariant {
        self.variant
    }

    /// Feed received bytes.
    pub fn push(&mut self, data: &[u8]) {
        self.framer.push(data);
    }

    /// Validate and decode the next complete packet, if any.
    ///
    /// `None` means more bytes are needed. An `Err` only concerns that one
    /// packet; keep calling.
    pub fn next_result(&mut self) -> Option<Ws3Result<Reading>> {
        let packet = self.framer.next_packet()?;
        Some(self.process_packet(&packet))
    }

    /// Validate and decode a single packet.
    pub fn process_packet(&self, packet: &Packet) -> Ws3Result<Reading> {
        trace!(%packet, "processing packet");
        let payload = self.validator.validate(packet).map_err(|e| {
            debug!(error = %e, "packet rejected");
            PacketError::from(e)
        })?;
        let reading = self.decoder.decode(&payload).map_err(|e| {
            debug!(error = %e, %payload, "payload could not be decoded");
            PacketError::from(e)
        })?;
        Ok(reading)
    }

    /// Discard the partial frame and any queued packets.
    pub fn reset(&mut self) {
        self.framer.reset();
    }

    /// The framer, for inspecting buffer state.
    pub fn framer(&self) -> &Framer {
        &self.framer
    }
}

impl Iterator for Pipeline {
    type Item = Ws3Result<Reading>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_result()
    }
}
