//! Static descriptions of sensor frame layouts.

use super::check::Checksum;

/// Byte order of a multi-byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// How the bytes of a field window become a value.
///
/// Integer-backed encodings read windows of 1, 2, 4 or 8 bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    /// Unsigned integer, published as `u64`.
    Unsigned(ByteOrder),
    /// Two's complement integer, published as `i64`.
    Signed(ByteOrder),
    /// Fixed-point number, published as `f64` after multiplying by `scale`.
    Scaled {
        signed: bool,
        order: ByteOrder,
        scale: f64,
    },
    /// A single bit of the (little-endian) window, published as `bool`.
    Flag { bit: u8 },
    /// `len` bits starting at `shift` of the (little-endian) window, published
    /// as `u64`.
    Bits { shift: u8, len: u8 },
}

/// One named field of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec<'a> {
    pub name: &'a str,
    /// Offset of the field's first byte from the start of the frame.
    pub offset: usize,
    pub width: usize,
    pub encoding: Encoding,
}

/// Location and algorithm of a frame's checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumSpec {
    /// First byte covered by the checksum.
    pub start: usize,
    /// One past the last byte covered by the checksum.
    pub end: usize,
    /// Offset of the stored checksum value.
    pub offset: usize,
    /// Width of the stored checksum value in bytes.
    pub width: usize,
    pub order: ByteOrder,
    pub algorithm: Checksum,
}

/// Bits of a frame byte that must hold a constant value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub offset: usize,
    pub mask: u8,
    pub expected: u8,
}

/// Description of a fixed-length sensor frame.
///
/// A descriptor is plain data and is typically a `const`. Its consistency
/// (every window inside the frame, supported integer widths) is a
/// precondition of decoding and is not checked on the hot path; see
/// [`FrameFormat::is_consistent`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameFormat<'a> {
    /// Human-readable protocol name.
    pub name: &'a str,
    pub frame_size: usize,
    /// Bytes found at the start of every frame.
    pub alignment: &'a [u8],
    pub checksum: ChecksumSpec,
    pub constraints: &'a [Constraint],
    /// Fields in the order they are inserted into decoded records.
    pub fields: &'a [FieldSpec<'a>],
}

impl FrameFormat<'_> {
    /// Check that every window of the descriptor lies inside the frame and
    /// uses a supported width.
    pub fn is_consistent(&self) -> bool {
        let inside = |offset: usize, width: usize| {
            offset
                .checked_add(width)
                .is_some_and(|end| end <= self.frame_size)
        };
        let integer_width = |width: usize| matches!(width, 1 | 2 | 4 | 8);

        let checksum = &self.checksum;

        !self.alignment.is_empty()
            && self.alignment.len() <= self.frame_size
            && checksum.start <= checksum.end
            && checksum.end <= self.frame_size
            && inside(checksum.offset, checksum.width)
            && integer_width(checksum.width)
            && self.constraints.iter().all(|c| c.offset < self.frame_size)
            && self.fields.iter().all(|f| {
                inside(f.offset, f.width)
                    && integer_width(f.width)
                    && match f.encoding {
                        Encoding::Flag { bit } => (bit as usize) < f.width * 8,
                        Encoding::Bits { shift, len } => {
                            len != 0 && (shift as usize + len as usize) <= f.width * 8
                        }
                        _ => true,
                    }
            })
    }
}
