//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module are suited to decoding records from byte
//! slices and readers, publishing to the [`FromRecords`] and [`FromRecord`]
//! traits.
//!
//! In many cases (when records are of a known shape), [`FromRecord`] can be
//! derived. See the [`FromRecord`](macro@FromRecord) macro for details.

use alloc::vec::Vec;

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::decode as decode_reader;
pub use slice::decode as decode_slice;

/// Produce record receivers for a stream.
///
/// Implemented for `Vec<T>`, which collects every record, and `Option<T>`,
/// which keeps the latest.
pub trait FromRecords {
    /// Retrieve a receiver for the next record, if one exists.
    fn add_record(&mut self) -> Option<&mut dyn FromRecord>;
}

impl<T: FromRecord + Default> FromRecords for Vec<T> {
    fn add_record(&mut self) -> Option<&mut dyn FromRecord> {
        self.push(Default::default());
        self.last_mut().map(|r| r as _)
    }
}

impl<T: FromRecord + Default> FromRecords for Option<T> {
    fn add_record(&mut self) -> Option<&mut dyn FromRecord> {
        Some(self.insert(Default::default()))
    }
}

/// Derive [`FromRecord`] for a struct representing a single record.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a single value for a record field, add the `field("name")`
/// attribute to an `Option<T>` struct field, where `name` is the field name
/// in the frame format and `T` is the primitive the field's encoding publishes
/// (`u64`, `i64`, `f64` or `bool`). Additional values received for the same
/// field will replace earlier ones.
///
/// To receive the timestamp attached with `SensorRecord::stamped`, supply
/// `timestamp` in place of a field name.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct HeartRate {
///     #[field(timestamp)]
///     at: Option<u64>,
///     #[field("heart_rate")]
///     bpm: Option<u64>,
///     #[field("speed")]
///     speed: Option<f64>,
/// }
/// ```
///
/// To receive values into arbitrary types, supply an accumulator closure.
/// Since the value type cannot be inferred, the second argument must be typed.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Beats {
///     #[field("heart_beat_number", |v, n: u64| v.push(n as u8))]
///     numbers: Vec<u8>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use pulsewire_derive::FromRecord;

/// Receive field values for a record.
///
/// Values arrive in the order of the fields in the frame format, after the
/// record's timestamp if it has one.
///
/// The default implementation of each method ignores received values.
///
/// See the [`FromRecord`](macro@FromRecord) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromRecord {
    /// Add the caller-assigned timestamp to the record.
    fn add_timestamp(&mut self, _: u64) {}
    /// Add a signed integer for a field to the record.
    fn add_i64(&mut self, field: &str, _: i64) {}
    /// Add an unsigned integer for a field to the record.
    ///
    /// This method receives values of `Unsigned` and `Bits` fields.
    fn add_u64(&mut self, field: &str, _: u64) {}
    /// Add a fixed-point value for a field to the record.
    fn add_f64(&mut self, field: &str, _: f64) {}
    /// Add a flag for a field to the record.
    fn add_bool(&mut self, field: &str, _: bool) {}
}
