//! Frame formats of supported sensors.
//!
//! Each format is a compile-time constant. Select one by sensor type, or parse
//! a protocol name into a [`FormatKind`].

use core::{fmt, str::FromStr};

use thiserror::Error;

use crate::sans::{
    check::Checksum,
    format::{ByteOrder::Little, ChecksumSpec, Constraint, Encoding, FieldSpec, FrameFormat},
};

/// Zephyr HxM Bluetooth heart-rate strap.
///
/// Frames are 60 bytes: `STX`, message id `0x26`, payload length 55, the
/// payload, a CRC-8 of the payload and `ETX`.
pub const ZEPHYR_HXM: FrameFormat<'static> = FrameFormat {
    name: "zephyr-hxm",
    frame_size: 60,
    alignment: &[0x02, 0x26, 0x37],
    checksum: ChecksumSpec {
        start: 3,
        end: 58,
        offset: 58,
        width: 1,
        order: Little,
        algorithm: Checksum::Crc8Maxim,
    },
    constraints: &[Constraint {
        offset: 59,
        mask: 0xFF,
        expected: 0x03,
    }],
    fields: &[
        FieldSpec {
            name: "firmware_id",
            offset: 3,
            width: 2,
            encoding: Encoding::Unsigned(Little),
        },
        FieldSpec {
            name: "battery",
            offset: 11,
            width: 1,
            encoding: Encoding::Unsigned(Little),
        },
        FieldSpec {
            name: "heart_rate",
            offset: 12,
            width: 1,
            encoding: Encoding::Unsigned(Little),
        },
        FieldSpec {
            name: "heart_beat_number",
            offset: 13,
            width: 1,
            encoding: Encoding::Unsigned(Little),
        },
        FieldSpec {
            name: "beat_timestamp",
            offset: 14,
            width: 2,
            encoding: Encoding::Unsigned(Little),
        },
        // Metres, in sixteenths.
        FieldSpec {
            name: "distance",
            offset: 50,
            width: 2,
            encoding: Encoding::Scaled {
                signed: false,
                order: Little,
                scale: 1.0 / 16.0,
            },
        },
        // Metres per second, in 256ths.
        FieldSpec {
            name: "speed",
            offset: 52,
            width: 2,
            encoding: Encoding::Scaled {
                signed: false,
                order: Little,
                scale: 1.0 / 256.0,
            },
        },
        FieldSpec {
            name: "strides",
            offset: 54,
            width: 1,
            encoding: Encoding::Unsigned(Little),
        },
    ],
};

/// ANT broadcast data message carrying a heart-rate monitor data page.
///
/// Frames are 13 bytes: sync `0xA4`, length 9, message id `0x4E`, the channel
/// number, eight bytes of page data and an exclusive-or checksum of every
/// preceding byte.
pub const ANT_HEART_RATE: FrameFormat<'static> = FrameFormat {
    name: "ant-heart-rate",
    frame_size: 13,
    alignment: &[0xA4, 0x09, 0x4E],
    checksum: ChecksumSpec {
        start: 0,
        end: 12,
        offset: 12,
        width: 1,
        order: Little,
        algorithm: Checksum::Xor8,
    },
    constraints: &[],
    fields: &[
        FieldSpec {
            name: "channel",
            offset: 3,
            width: 1,
            encoding: Encoding::Unsigned(Little),
        },
        FieldSpec {
            name: "data_page",
            offset: 4,
            width: 1,
            encoding: Encoding::Bits { shift: 0, len: 7 },
        },
        FieldSpec {
            name: "page_toggle",
            offset: 4,
            width: 1,
            encoding: Encoding::Flag { bit: 7 },
        },
        // Seconds, in 1024ths.
        FieldSpec {
            name: "beat_time",
            offset: 8,
            width: 2,
            encoding: Encoding::Scaled {
                signed: false,
                order: Little,
                scale: 1.0 / 1024.0,
            },
        },
        FieldSpec {
            name: "beat_count",
            offset: 10,
            width: 1,
            encoding: Encoding::Unsigned(Little),
        },
        FieldSpec {
            name: "heart_rate",
            offset: 11,
            width: 1,
            encoding: Encoding::Unsigned(Little),
        },
    ],
};

/// A supported sensor protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    ZephyrHxm,
    AntHeartRate,
}

impl FormatKind {
    pub const ALL: [Self; 2] = [Self::ZephyrHxm, Self::AntHeartRate];

    /// The frame format of this protocol.
    pub fn format(self) -> FrameFormat<'static> {
        match self {
            Self::ZephyrHxm => ZEPHYR_HXM,
            Self::AntHeartRate => ANT_HEART_RATE,
        }
    }

    pub fn name(self) -> &'static str {
        self.format().name
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A protocol name matched no supported format.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown sensor protocol.")]
pub struct UnknownFormat;

impl FromStr for FormatKind {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownFormat)
    }
}
