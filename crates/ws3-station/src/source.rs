//! Non-blocking byte sources.
//!
//! The station never waits for data. A source hands over whatever bytes are
//! ready and returns `Ok(0)` when there are none.

use std::collections::VecDeque;
use std::io::{self, Read};

/// A serial byte stream that can be polled without blocking.
pub trait ByteSource {
    /// Copy available bytes into `buf` and return how many were copied.
    ///
    /// Returns `Ok(0)` when nothing is available right now.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Whether the source has ended and will never produce more bytes.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Adapts any [`Read`] (a serial port handle, a capture file, stdin).
///
/// `WouldBlock`, `TimedOut` and `Interrupted` mean "nothing yet". A read of
/// zero bytes marks the source exhausted.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    exhausted: bool,
}

impl<R: Read> ReaderSource<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        ReaderSource {
            reader,
            exhausted: false,
        }
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.exhausted || buf.is_empty() {
            return Ok(0);
        }
        match self.reader.read(buf) {
            Ok(0) => {
                self.exhausted = true;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// In-memory source fed by the caller, e.g. from a UART interrupt handler or
/// a test.
#[derive(Debug, Default)]
pub struct MemorySource {
    pending: VecDeque<u8>,
    closed: bool,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the next reads.
    pub fn feed(&mut self, data: &[u8]) {
        self.pending.extend(data);
    }

    /// Mark the source ended once its queued bytes are drained.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Bytes queued but not yet read.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl ByteSource for MemorySource {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.closed && self.pending.is_empty()
    }
}
