//! States and driver of the stream decoder.

use alloc::vec::Vec;

use either::Either::{self, Left, Right};
use thiserror::Error;

use super::{
    buffer::{Accumulator, Overflow},
    decode::decode,
    format::FrameFormat,
    record::SensorRecord,
    sync::{Alignment, find_alignment},
    validate::{Rejection, validate},
};

/// Default maximum number of buffered bytes.
pub const DEFAULT_MAX_BUFFERED: usize = 4096;

/// Default maximum number of rejected candidates examined per `feed` call.
pub const DEFAULT_REJECTION_BUDGET: usize = 256;

/// State token to look for the next candidate frame.
#[derive(Debug, Default)]
pub struct Seeking(());

impl Seeking {
    pub fn new() -> Self {
        Self(())
    }

    /// Transition to another state by scanning buffered bytes for an
    /// alignment with a whole frame behind it.
    ///
    /// Returns either the number of leading bytes that can never begin a
    /// frame and a successor token, or a candidate frame state token.
    pub fn advance(self, buffered: &[u8], format: &FrameFormat) -> Either<(usize, Self), HaveFrame> {
        match find_alignment(buffered, format.alignment, format.frame_size) {
            Alignment::Candidate(offset) => Right(HaveFrame { offset }),
            Alignment::Insufficient { discardable } => Left((discardable, self)),
        }
    }
}

/// State token holding a candidate frame awaiting validation.
#[derive(Debug)]
pub struct HaveFrame {
    offset: usize,
}

impl HaveFrame {
    /// Offset of the candidate frame in the buffered bytes.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Transition to another state by validating and decoding the candidate
    /// frame.
    ///
    /// **The buffered bytes must be those the candidate was found in.**
    ///
    /// Returns the decoded record or the reason for rejecting the candidate,
    /// the number of leading bytes to discard, and a successor state token. A
    /// valid frame is discarded whole. A rejected candidate discards only its
    /// first byte, leaving any alignment inside it to be found next.
    pub fn advance<'a>(
        self,
        buffered: &[u8],
        format: &FrameFormat<'a>,
    ) -> (Result<SensorRecord<'a>, Rejection>, usize, Seeking) {
        let frame = &buffered[self.offset..self.offset + format.frame_size];

        match validate(frame, format) {
            Ok(()) => (
                Ok(decode(frame, format)),
                self.offset + format.frame_size,
                Seeking(()),
            ),
            Err(rejection) => (Err(rejection), self.offset + 1, Seeking(())),
        }
    }
}

/// A fatal error feeding bytes to a decoder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The rejection budget was spent on a full buffer with input left over.
    /// The stream is garbled or uses another protocol, and the connection
    /// should be reset.
    #[error("Stalled with {buffered} bytes to buffer (maximum {limit}).")]
    StreamCorrupt { buffered: usize, limit: usize },
    /// Bytes were fed after a fatal error.
    #[error("Decoder was poisoned by an earlier stream error.")]
    Poisoned,
}

impl From<Overflow> for StreamError {
    fn from(err: Overflow) -> Self {
        Self::StreamCorrupt {
            buffered: err.buffered,
            limit: err.limit,
        }
    }
}

/// Tuning of a [`StreamDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum number of bytes buffered at once. Never less than one frame
    /// plus its alignment.
    pub max_buffered: usize,
    /// Maximum number of rejected candidates examined in one call. Remaining
    /// candidates are deferred to the next call.
    pub rejection_budget: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_buffered: DEFAULT_MAX_BUFFERED,
            rejection_budget: DEFAULT_REJECTION_BUDGET,
        }
    }
}

impl DecoderConfig {
    pub fn with_max_buffered(self, max_buffered: usize) -> Self {
        Self {
            max_buffered,
            ..self
        }
    }

    pub fn with_rejection_budget(self, rejection_budget: usize) -> Self {
        Self {
            rejection_budget,
            ..self
        }
    }
}

/// Decoder turning chunks of a byte stream into sensor records.
///
/// # Example
///
/// ```
/// let mut decoder = StreamDecoder::new(formats::ZEPHYR_HXM);
///
/// while let Some(chunk) = transport.read_chunk() {
///     for record in decoder.feed(&chunk)? {
///         store.push(record.stamped(now()));
///     }
/// }
/// ```
#[derive(Debug)]
pub struct StreamDecoder<'a> {
    format: FrameFormat<'a>,
    buffer: Accumulator,
    rejection_budget: usize,
    deferred: bool,
    poisoned: bool,
}

impl<'a> StreamDecoder<'a> {
    /// Create a decoder for a frame format with the default configuration.
    pub fn new(format: FrameFormat<'a>) -> Self {
        Self::with_config(format, DecoderConfig::default())
    }

    pub fn with_config(format: FrameFormat<'a>, config: DecoderConfig) -> Self {
        debug_assert!(format.is_consistent(), "inconsistent frame format");

        let floor = format.frame_size + format.alignment.len();

        Self {
            format,
            buffer: Accumulator::new(config.max_buffered.max(floor)),
            rejection_budget: config.rejection_budget.max(1),
            deferred: false,
            poisoned: false,
        }
    }

    /// Feed a chunk of bytes, returning the records of every frame completed
    /// by it, in stream order.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<SensorRecord<'a>>, StreamError> {
        let mut records = Vec::new();
        self.feed_into(bytes, |record| records.push(record))?;
        Ok(records)
    }

    /// Feed a chunk of bytes, passing the record of every frame completed by
    /// it to a sink, in stream order.
    ///
    /// The chunk is taken in slices that fit the remaining capacity, each
    /// synchronized before the next is appended, so a chunk of any length is
    /// accepted while frames keep being found or discarded.
    ///
    /// Once the rejection budget is spent, no further candidates are examined
    /// in this call. If the rest of the chunk then no longer fits, the
    /// synchronizer has stalled and the decoder is poisoned: this call returns
    /// [`StreamError::StreamCorrupt`] and every later call returns
    /// [`StreamError::Poisoned`].
    pub fn feed_into(
        &mut self,
        mut bytes: &[u8],
        mut sink: impl FnMut(SensorRecord<'a>),
    ) -> Result<(), StreamError> {
        if self.poisoned {
            Err(StreamError::Poisoned)?;
        }

        self.deferred = false;
        let mut rejections = 0;

        loop {
            let (head, tail) = bytes.split_at(self.capacity().min(bytes.len()));
            bytes = tail;

            if let Err(err) = self.buffer.append(head) {
                return Err(self.poison(err));
            }

            if !self.deferred {
                self.synchronize(&mut rejections, &mut sink);
            }

            if bytes.is_empty() {
                break;
            }

            if self.capacity() == 0 {
                let stalled = Overflow {
                    buffered: self.buffer.len() + bytes.len(),
                    limit: self.buffer.limit(),
                };
                return Err(self.poison(stalled));
            }
        }

        Ok(())
    }

    /// Drive the state machine over the buffered bytes until it needs more
    /// data or the rejection budget is spent with a candidate still waiting.
    fn synchronize(&mut self, rejections: &mut usize, sink: &mut impl FnMut(SensorRecord<'a>)) {
        let mut state = Seeking(());

        loop {
            let candidate = match state.advance(self.buffer.as_slice(), &self.format) {
                Left((discardable, _)) => {
                    if discardable != 0 {
                        log::debug!(
                            "{}: discarding {discardable} unaligned bytes",
                            self.format.name
                        );
                        self.buffer.discard_through(discardable);
                    }
                    break;
                }
                Right(candidate) => candidate,
            };

            if *rejections == self.rejection_budget {
                self.deferred = true;
                break;
            }

            let offset = candidate.offset();
            let (result, consumed, successor) =
                candidate.advance(self.buffer.as_slice(), &self.format);

            self.buffer.discard_through(consumed);
            state = successor;

            match result {
                Ok(record) => sink(record),
                Err(rejection) => {
                    log::trace!(
                        "{}: rejected candidate at offset {offset}: {rejection}",
                        self.format.name
                    );
                    *rejections += 1;
                }
            }
        }
    }

    fn poison(&mut self, err: Overflow) -> StreamError {
        log::warn!("{}: {err} Poisoning decoder.", self.format.name);
        self.poisoned = true;
        err.into()
    }

    /// The fixed length of a frame, useful as a transport read size.
    pub fn frame_size(&self) -> usize {
        self.format.frame_size
    }

    pub fn format(&self) -> &FrameFormat<'a> {
        &self.format
    }

    /// Number of bytes held for the next call.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of bytes that can be appended before the maximum is reached.
    pub fn capacity(&self) -> usize {
        self.buffer.limit() - self.buffer.len()
    }

    /// Whether the last call spent its rejection budget with a candidate
    /// still left to examine. Feeding an empty chunk resumes the work.
    pub fn has_deferred_work(&self) -> bool {
        self.deferred
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}
