//! Checksum algorithms used by sensor frames.

/// A checksum algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    /// Exclusive or of every covered byte.
    Xor8,
    /// Wrapping sum of every covered byte.
    Sum8,
    /// Reflected CRC-8 with polynomial `0x8C` and zero initial value, as used
    /// by Zephyr straps.
    Crc8Maxim,
    /// The CRC-16 used by Garmin FIT and ANT file transfers.
    ///
    /// No built-in format uses it. It is available to user descriptors for
    /// sensors that carry a two-byte checksum.
    Crc16,
}

impl Checksum {
    /// Compute the checksum of a slice of bytes.
    pub fn compute(self, r: &[u8]) -> u64 {
        match self {
            Self::Xor8 => r.iter().fold(0u8, |acc, b| acc ^ b).into(),
            Self::Sum8 => r.iter().fold(0u8, |acc, b| acc.wrapping_add(*b)).into(),
            Self::Crc8Maxim => compute_crc8(0, r).into(),
            Self::Crc16 => compute_crc(0, r).into(),
        }
    }
}

/// Accumulate a slice of bytes into a reflected CRC-8 (polynomial `0x8C`).
pub fn compute_crc8(init: u8, r: &[u8]) -> u8 {
    r.iter().fold(init, |mut crc, b| {
        crc ^= b;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ 0x8C } else { crc >> 1 };
        }
        crc
    })
}

/// Accumulate a slice of bytes into a CRC-16 value.
pub fn compute_crc(init: u16, r: &[u8]) -> u16 {
    r.iter().fold(init, |acc, b| crc_byte(acc, *b))
}

/// Accumulate a single byte into a CRC-16 value, a nibble at a time.
fn crc_byte(mut crc: u16, b: u8) -> u16 {
    const CRC_TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];

    for nibble in [b & 0xF, b >> 4] {
        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc = crc ^ tmp ^ CRC_TABLE[nibble as usize];
    }

    crc
}
