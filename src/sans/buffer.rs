//! Growable buffer of bytes awaiting synchronization.

use alloc::vec::Vec;

use thiserror::Error;

/// Appending would grow the buffer past its maximum length.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Buffering {buffered} bytes exceeds the maximum of {limit}.")]
pub struct Overflow {
    pub buffered: usize,
    pub limit: usize,
}

/// Bytes received from a transport and not yet consumed by a frame.
///
/// Discarding only advances a cursor. Discarded bytes are dropped physically
/// on the next append, so a run of single-byte discards stays linear.
#[derive(Debug)]
pub struct Accumulator {
    data: Vec<u8>,
    cursor: usize, // First unconsumed byte.
    limit: usize,
}

impl Accumulator {
    /// Create an empty buffer holding at most `limit` unconsumed bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            cursor: 0,
            limit,
        }
    }

    /// Append bytes to the tail of the buffer.
    ///
    /// Fails without modifying the buffer if the unconsumed length would
    /// exceed the limit.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), Overflow> {
        let buffered = self.len() + bytes.len();
        if buffered > self.limit {
            Err(Overflow {
                buffered,
                limit: self.limit,
            })?;
        }

        if self.cursor != 0 {
            self.data.drain(..self.cursor);
            self.cursor = 0;
        }

        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Discard the first `n` unconsumed bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`Accumulator::len`].
    pub fn discard_through(&mut self, n: usize) {
        assert!(
            n <= self.len(),
            "discarding {n} bytes from a buffer holding {}",
            self.len()
        );
        self.cursor += n;

        if self.cursor == self.data.len() {
            self.data.clear();
            self.cursor = 0;
        }
    }

    /// Number of unconsumed bytes.
    pub fn len(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of unconsumed bytes.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// View the unconsumed bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.cursor..]
    }
}
