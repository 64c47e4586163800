//! Extraction of field values from validated frames.

use alloc::vec::Vec;

use zerocopy::{
    FromBytes,
    byteorder::{BE, I16, I32, I64, LE, U16, U32, U64},
};

use super::{
    format::{ByteOrder, Encoding, FieldSpec, FrameFormat},
    record::{SensorRecord, Value},
};

/// Decode every field of a validated frame into a record.
///
/// Fields are inserted in descriptor order. A field whose window is not
/// readable under its encoding (only possible with an inconsistent
/// descriptor) is left out of the record.
pub fn decode<'a>(frame: &[u8], format: &FrameFormat<'a>) -> SensorRecord<'a> {
    let values = format
        .fields
        .iter()
        .filter_map(|field| Some((field.name, decode_field(frame, field)?)))
        .collect::<Vec<_>>();

    SensorRecord::new(values)
}

/// Decode a single field from a frame.
pub fn decode_field(frame: &[u8], field: &FieldSpec) -> Option<Value> {
    let r = frame.get(field.offset..field.offset + field.width)?;

    Some(match field.encoding {
        Encoding::Unsigned(order) => Value::UInt(read_unsigned(r, order)?),
        Encoding::Signed(order) => Value::Int(read_signed(r, order)?),
        Encoding::Scaled {
            signed,
            order,
            scale,
        } => {
            let raw = if signed {
                read_signed(r, order)? as f64
            } else {
                read_unsigned(r, order)? as f64
            };
            Value::Float(raw * scale)
        }
        Encoding::Flag { bit } => {
            let raw = read_unsigned(r, ByteOrder::Little)?;
            Value::Bool(raw.checked_shr(bit.into())? & 1 != 0)
        }
        Encoding::Bits { shift, len } => {
            let raw = read_unsigned(r, ByteOrder::Little)?;
            let mask = u64::MAX.checked_shr(64 - u32::from(len)).unwrap_or(0);
            Value::UInt(raw.checked_shr(shift.into())? & mask)
        }
    })
}

macro_rules! read_integer {
    ($r:expr, $order:expr, $into:ty, $one:ty, $($width:literal => $t:ident),*) => {
        match ($r.len(), $order) {
            (1, _) => Some(<$into>::from(<$one>::from_ne_bytes([$r[0]]))),
            $(
                ($width, ByteOrder::Little) => {
                    $t::<LE>::read_from_bytes($r).ok().map(|v| <$into>::from(v.get()))
                }
                ($width, ByteOrder::Big) => {
                    $t::<BE>::read_from_bytes($r).ok().map(|v| <$into>::from(v.get()))
                }
            )*
            _ => None,
        }
    };
}

/// Read an unsigned integer from a window of 1, 2, 4 or 8 bytes.
pub fn read_unsigned(r: &[u8], order: ByteOrder) -> Option<u64> {
    read_integer!(r, order, u64, u8, 2 => U16, 4 => U32, 8 => U64)
}

/// Read a two's complement integer from a window of 1, 2, 4 or 8 bytes.
pub fn read_signed(r: &[u8], order: ByteOrder) -> Option<i64> {
    read_integer!(r, order, i64, i8, 2 => I16, 4 => I32, 8 => I64)
}
