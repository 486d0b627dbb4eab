//! Line framing for the serial byte stream.
//!
//! The station sends one ASCII packet per line. The framer accumulates bytes
//! until it sees `\n`, then hands out everything before it (minus a trailing
//! `\r`) as a [`Packet`].
//!
//! The accumulator is bounded. If `max_frame_len` bytes arrive without a
//! terminator the partial frame is dropped and the framer discards input up to
//! and including the next `\n`, so a floating or mis-clocked UART cannot grow
//! memory without limit.

use std::collections::VecDeque;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{trace, warn};

use crate::layout::{PARTICULATE_LAYOUT, TERMINATOR};

/// Default accumulator limit; holds the longest valid packet plus `\r`.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64;

/// Smallest accepted limit: the particulate packet plus `\r`.
pub const MIN_FRAME_LEN: usize = PARTICULATE_LAYOUT.packet_len() + 1;

/// Largest accepted limit.
pub const MAX_FRAME_LEN: usize = 4096;

/// One complete line from the stream, terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    bytes: Bytes,
}

impl Packet {
    /// Wrap raw line contents.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Packet {
            bytes: bytes.into(),
        }
    }

    /// Packet contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the packet is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Cheap sub-slice sharing the same buffer.
    pub(crate) fn slice(&self, range: std::ops::Range<usize>) -> Bytes {
        self.bytes.slice(range)
    }
}

impl From<&[u8]> for Packet {
    fn from(bytes: &[u8]) -> Self {
        Packet::new(Bytes::copy_from_slice(bytes))
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

/// Accumulates stream bytes into packets.
#[derive(Debug)]
pub struct Framer {
    /// Bytes received since the last terminator.
    buffer: BytesMut,
    /// Completed packets not yet taken by the caller.
    ready: VecDeque<Packet>,
    /// Accumulator limit.
    max_frame_len: usize,
    /// Dropping input until the next terminator after an overflow.
    resyncing: bool,
    /// Number of overflows since creation.
    overflows: u64,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    /// Create a framer with the default limit.
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    /// Create a framer that overflows after `max_frame_len` bytes.
    ///
    /// The limit is clamped to `MIN_FRAME_LEN..=MAX_FRAME_LEN`. Only the
    /// default limit is allocated up front; larger limits grow on demand.
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        let max_frame_len = max_frame_len.clamp(MIN_FRAME_LEN, MAX_FRAME_LEN);
        Framer {
            buffer: BytesMut::with_capacity(max_frame_len.min(DEFAULT_MAX_FRAME_LEN)),
            ready: VecDeque::new(),
            max_frame_len,
            resyncing: false,
            overflows: 0,
        }
    }

    /// Feed one byte; returns a packet when it completes one.
    pub fn push_byte(&mut self, byte: u8) -> Option<Packet> {
        if byte == TERMINATOR {
            if self.resyncing {
                trace!("framer resynchronised");
                self.resyncing = false;
                return None;
            }
            let mut line = self.buffer.split();
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            if line.is_empty() {
                return None;
            }
            return Some(Packet::new(line.freeze()));
        }

        if self.resyncing {
            return None;
        }

        if self.buffer.len() >= self.max_frame_len {
            self.overflows += 1;
            warn!(
                limit = self.max_frame_len,
                overflows = self.overflows,
                "no terminator within frame limit, discarding until next line"
            );
            self.buffer.clear();
            self.resyncing = true;
            return None;
        }

        self.buffer.put_u8(byte);
        None
    }

    /// Feed a chunk of bytes, queueing any packets it completes.
    pub fn push(&mut self, data: &[u8]) {
        for &byte in data {
            if let Some(packet) = self.push_byte(byte) {
                self.ready.push_back(packet);
            }
        }
    }

    /// Take the oldest queued packet.
    pub fn next_packet(&mut self) -> Option<Packet> {
        self.ready.pop_front()
    }

    /// Drop the partial frame, queued packets and any resync state.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.ready.clear();
        self.resyncing = false;
    }

    /// Bytes in the partial frame.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Packets waiting in the queue.
    pub fn queued(&self) -> usize {
        self.ready.len()
    }

    /// Overflows since creation.
    pub fn overflow_count(&self) -> u64 {
        self.overflows
    }

    /// Whether input is being dropped until the next terminator.
    pub fn is_resyncing(&self) -> bool {
        self.resyncing
    }

    /// Accumulator limit in bytes.
    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut framer = Framer::new();
        framer.push(b"c000s000g000t069r000p000h49b09945*38\r\n");

        let packet = framer.next_packet().expect("should frame packet");
        assert_eq!(packet.as_bytes(), b"c000s000g000t069r000p000h49b09945*38");
        assert!(framer.next_packet().is_none());
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut framer = Framer::new();
        let mut packets = Vec::new();
        for &byte in b"abc\nde" {
            if let Some(packet) = framer.push_byte(byte) {
                packets.push(packet);
            }
        }
        assert_eq!(packets, vec![Packet::from(&b"abc"[..])]);
        assert_eq!(framer.buffered_len(), 2);
    }

    #[test]
    fn test_partial_then_rest() {
        let mut framer = Framer::new();
        framer.push(b"c000s000g000");
        assert!(framer.next_packet().is_none());

        framer.push(b"t069\n");
        assert_eq!(
            framer.next_packet().map(|p| p.to_string()),
            Some("c000s000g000t069".to_string())
        );
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut framer = Framer::new();
        framer.push(b"first\nsecond\r\nthird");

        assert_eq!(framer.queued(), 2);
        assert_eq!(framer.next_packet().unwrap().as_bytes(), b"first");
        assert_eq!(framer.next_packet().unwrap().as_bytes(), b"second");
        assert!(framer.next_packet().is_none());
        assert_eq!(framer.buffered_len(), 5);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let mut framer = Framer::new();
        framer.push(b"\n\r\n\nx\n");
        assert_eq!(framer.queued(), 1);
    }

    #[test]
    fn test_no_terminator_never_emits() {
        let mut framer = Framer::new();
        for _ in 0..10_000 {
            assert!(framer.push_byte(b'7').is_none());
            assert!(framer.buffered_len() <= framer.max_frame_len());
        }
        assert!(framer.next_packet().is_none());
        assert!(framer.overflow_count() >= 1);
    }

    #[test]
    fn test_overflow_resyncs_on_next_line() {
        let mut framer = Framer::with_max_frame_len(64);
        framer.push(&[b'x'; 100]);
        assert!(framer.is_resyncing());
        assert_eq!(framer.overflow_count(), 1);

        // Tail of the overlong line is discarded, the next line is kept.
        framer.push(b"tail\ngood\n");
        assert!(!framer.is_resyncing());
        assert_eq!(framer.next_packet().unwrap().as_bytes(), b"good");
        assert!(framer.next_packet().is_none());
    }

    #[test]
    fn test_limit_raised_to_longest_packet() {
        let framer = Framer::with_max_frame_len(10);
        assert_eq!(framer.max_frame_len(), 62);
    }

    #[test]
    fn test_huge_limit_is_capped() {
        let mut framer = Framer::with_max_frame_len(usize::MAX);
        assert_eq!(framer.max_frame_len(), MAX_FRAME_LEN);

        framer.push(&vec![b'x'; MAX_FRAME_LEN + 1]);
        assert_eq!(framer.overflow_count(), 1);
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_reset() {
        let mut framer = Framer::new();
        framer.push(b"done\npartial");
        framer.reset();

        assert_eq!(framer.buffered_len(), 0);
        assert_eq!(framer.queued(), 0);
        framer.push(b"fresh\n");
        assert_eq!(framer.next_packet().unwrap().as_bytes(), b"fresh");
    }
}
