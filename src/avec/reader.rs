//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{
    collections::VecDeque,
    io::{ErrorKind, Read},
    vec,
    vec::Vec,
};

use thiserror::Error;

use crate::sans::{
    format::FrameFormat,
    record::SensorRecord,
    stream::{StreamDecoder, StreamError},
};

use super::FromRecords;

extern crate std;

/// Bytes requested from the reader per call, unless a frame is longer or the
/// decoder has less room.
const CHUNK_SIZE: usize = 256;

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The stream decoder failed.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Decode records from a reader of a byte stream until it ends, publishing
/// to a receiver.
///
/// This method is also re-exported as `pulsewire::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode(format: FrameFormat, r: &mut impl Read, o: &mut impl FromRecords) -> Result<(), Error> {
    for record in Records::new(format, r) {
        let record = record?;

        if let Some(o) = o.add_record() {
            record.publish(o);
        }
    }

    Ok(())
}

/// Iterator pulling chunks from a reader on demand and yielding decoded
/// records.
///
/// Iteration ends when the reader reports the end of the stream, or after the
/// first error. Interrupted reads are retried.
///
/// _Requires Cargo feature `std`._
pub struct Records<'a, R> {
    decoder: StreamDecoder<'a>,
    reader: R,
    chunk: Vec<u8>,
    pending: VecDeque<SensorRecord<'a>>,
    done: bool,
}

impl<'a, R: Read> Records<'a, R> {
    /// Create an iterator decoding a reader with a fresh decoder.
    pub fn new(format: FrameFormat<'a>, reader: R) -> Self {
        Self::with_decoder(StreamDecoder::new(format), reader)
    }

    /// Create an iterator decoding a reader with an existing decoder, such as
    /// one with a custom configuration.
    pub fn with_decoder(decoder: StreamDecoder<'a>, reader: R) -> Self {
        let chunk = vec![0; CHUNK_SIZE.max(decoder.frame_size())];

        Self {
            decoder,
            reader,
            chunk,
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// Recover the decoder and reader.
    pub fn into_inner(self) -> (StreamDecoder<'a>, R) {
        (self.decoder, self.reader)
    }
}

impl<'a, R: Read> Iterator for Records<'a, R> {
    type Item = Result<SensorRecord<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }

            if self.done {
                return None;
            }

            let n = if self.decoder.has_deferred_work() {
                0 // Finish buffered work before reading more.
            } else {
                let len = self.decoder.capacity().min(self.chunk.len());
                match self.reader.read(&mut self.chunk[..len]) {
                    Ok(0) => {
                        self.done = true;
                        continue;
                    }
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e.into()));
                    }
                }
            };

            let pending = &mut self.pending;
            if let Err(e) = self
                .decoder
                .feed_into(&self.chunk[..n], |record| pending.push_back(record))
            {
                self.done = true;
                return Some(Err(e.into()));
            }
        }
    }
}
