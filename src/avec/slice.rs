//! Slice-based decoder implementation.

use thiserror::Error;

use crate::sans::{Decoder, format::FrameFormat, record::SensorRecord, stream::StreamError};

use super::FromRecords;

/// Errors occurring while decoding from a slice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The stream decoder failed.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Decode records from a slice of a byte stream, publishing to a receiver.
///
/// Corrupted stretches of the slice are skipped. Trailing bytes that do not
/// complete a frame are ignored.
///
/// This method is also re-exported as `pulsewire::avec::decode_slice`.
pub fn decode(format: FrameFormat, r: &[u8], o: &mut impl FromRecords) -> Result<(), Error> {
    decode_with(Decoder::new(format), r, o)
}

/// Decode records from a slice with an existing decoder, such as one with a
/// custom configuration.
pub fn decode_with(
    mut decoder: Decoder,
    mut r: &[u8],
    o: &mut impl FromRecords,
) -> Result<(), Error> {
    let mut publish = |record: SensorRecord| {
        if let Some(o) = o.add_record() {
            record.publish(o);
        }
    };

    while !r.is_empty() {
        let (chunk, rest) = r.split_at(decoder.capacity().min(r.len()));
        r = rest;

        decoder.feed_into(chunk, &mut publish)?;

        // Resume work deferred by the rejection budget.
        while decoder.has_deferred_work() {
            decoder.feed_into(&[], &mut publish)?;
        }
    }

    Ok(())
}
