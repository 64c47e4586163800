//! Structural validation of candidate frames.

use thiserror::Error;

use super::{decode::read_unsigned, format::FrameFormat};

/// Reason a candidate frame was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    /// Calculated and found checksum values do not match.
    #[error("Calculated ({calculated:#x}) and found ({found:#x}) checksum values do not match.")]
    Checksum { found: u64, calculated: u64 },
    /// A constant byte does not hold its expected bits.
    #[error("Byte {offset} holds {found:#04x} where {expected:#04x} is expected.")]
    Constraint { offset: usize, found: u8, expected: u8 },
}

/// Validate a candidate frame of exactly `format.frame_size` bytes.
///
/// The checksum is checked before any constraint, and the first violation is
/// returned.
pub fn validate(frame: &[u8], format: &FrameFormat) -> Result<(), Rejection> {
    let checksum = &format.checksum;

    let calculated = checksum.algorithm.compute(&frame[checksum.start..checksum.end]);
    let found = read_unsigned(&frame[checksum.offset..checksum.offset + checksum.width], checksum.order);

    if found != Some(calculated) {
        Err(Rejection::Checksum {
            found: found.unwrap_or_default(),
            calculated,
        })?;
    }

    for c in format.constraints {
        let found = frame[c.offset] & c.mask;
        if found != c.expected {
            Err(Rejection::Constraint {
                offset: c.offset,
                found,
                expected: c.expected,
            })?;
        }
    }

    Ok(())
}
