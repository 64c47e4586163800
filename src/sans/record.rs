//! Decoded sensor records.

use alloc::vec::Vec;

use crate::avec::FromRecord;

/// A decoded field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// The value as a signed integer, if it is an integer that fits.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::UInt(v) => v.try_into().ok(),
            _ => None,
        }
    }

    /// The value as an unsigned integer, if it is an integer that fits.
    pub fn as_u64(self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(v),
            Self::Int(v) => v.try_into().ok(),
            _ => None,
        }
    }

    /// The value as a float. Integers are converted.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            Self::UInt(v) => Some(v as f64),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }
}

/// Field values decoded from one frame.
///
/// Values keep the order of the fields in the frame's descriptor. The record
/// carries no time of its own; callers that track arrival time attach it with
/// [`SensorRecord::stamped`].
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord<'a> {
    values: Vec<(&'a str, Value)>,
    timestamp: Option<u64>,
}

impl<'a> SensorRecord<'a> {
    pub(crate) fn new(values: Vec<(&'a str, Value)>) -> Self {
        Self {
            values,
            timestamp: None,
        }
    }

    /// Attach a caller-defined timestamp to the record.
    pub fn stamped(self, timestamp: u64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..self
        }
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values
            .iter()
            .find_map(|(n, v)| (*n == name).then_some(*v))
    }

    /// Iterate over field names and values in descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Value)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Publish the timestamp and every value to a receiver.
    pub fn publish(&self, o: &mut (impl FromRecord + ?Sized)) {
        if let Some(timestamp) = self.timestamp {
            o.add_timestamp(timestamp);
        }

        for (name, value) in self.iter() {
            match value {
                Value::Int(v) => o.add_i64(name, v),
                Value::UInt(v) => o.add_u64(name, v),
                Value::Float(v) => o.add_f64(name, v),
                Value::Bool(v) => o.add_bool(name, v),
            }
        }
    }
}
