#![no_std]

//! A resynchronizing frame decoder for heart-rate, cadence and power sensor
//! byte streams.
//!
//! Wireless sensor transports deliver bytes in chunks that bear no relation to
//! message boundaries, and lose or corrupt bytes along the way. Pulsewire finds
//! fixed-length frames in such a stream, validates them against a checksum and
//! any constant bits, and decodes their fields into [`SensorRecord`] values.
//! Corrupted stretches are skipped and decoding resumes at the next valid
//! frame.
//!
//! Most users should construct a [`StreamDecoder`] from one of the descriptors
//! in [`formats`] and call [`StreamDecoder::feed`] with each chunk read from
//! the transport. The [`avec`] module offers typed receivers and decoders for
//! slices and readers. The [`sans`] module documents the underlying
//! finite-state machine.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based decoder (default).
//!
//! [`SensorRecord`]: sans::record::SensorRecord
//! [`StreamDecoder`]: sans::stream::StreamDecoder
//! [`StreamDecoder::feed`]: sans::stream::StreamDecoder::feed

extern crate alloc;

pub mod avec;
pub mod formats;
pub mod sans;

pub use sans::{
    format::FrameFormat,
    record::{SensorRecord, Value},
    stream::{DecoderConfig, StreamDecoder, StreamError},
};
