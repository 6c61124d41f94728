//! # Core Wire Types
//!
//! Scalar types shared by every frame kind. Values are held at their full
//! in-memory width; how many bytes they occupy on the wire is decided per
//! field by the width tables in [`crate::width`].

#![forbid(unsafe_code)]

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Scalar Types
// ============================================================================

/// Packet sequence number.
///
/// Transmitted using 1, 2, 4 or 6 low-order bytes; the high-order bytes are
/// implicitly zero.
pub type SequenceNumber = u64;

/// Stream identifier.
///
/// Transmitted using 1, 2, 3 or 4 bytes in STREAM frames and always 4 bytes
/// in the fixed-layout control frames.
pub type StreamId = u32;

/// Byte offset within a stream.
///
/// Transmitted using 0, 2, 3, 4, 5, 6, 7 or 8 bytes in STREAM frames, where 0
/// bytes means the field is absent and the offset is 0.
pub type ByteOffset = u64;

/// Error code carried by RST_STREAM, CONNECTION_CLOSE and GOAWAY.
pub type ErrorCode = u32;

/// Largest value representable in 6 bytes (48-bit sequence numbers).
pub const SEQUENCE_NUMBER_MAX: SequenceNumber = (1u64 << 48) - 1;

// ============================================================================
// Out-of-band Sequence Number Width
// ============================================================================

/// Byte width of the least-unacked delta in STOP_WAITING frames.
///
/// The width is not carried on the wire. The connection layer derives it
/// from protocol state (e.g. the packet number length of the enclosing
/// packet) and hands it to the parser/serializer for every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SequenceNumberWidth {
    /// 1 byte
    One,
    /// 2 bytes
    Two,
    /// 4 bytes
    Four,
    /// 6 bytes
    Six,
}

impl SequenceNumberWidth {
    /// All widths, narrowest first.
    pub const ALL: [SequenceNumberWidth; 4] = [
        SequenceNumberWidth::One,
        SequenceNumberWidth::Two,
        SequenceNumberWidth::Four,
        SequenceNumberWidth::Six,
    ];

    /// Number of bytes this width occupies on the wire.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            SequenceNumberWidth::One => 1,
            SequenceNumberWidth::Two => 2,
            SequenceNumberWidth::Four => 4,
            SequenceNumberWidth::Six => 6,
        }
    }

    /// Build a width from a raw byte count.
    pub fn from_bytes(bytes: usize) -> Result<Self> {
        match bytes {
            1 => Ok(SequenceNumberWidth::One),
            2 => Ok(SequenceNumberWidth::Two),
            4 => Ok(SequenceNumberWidth::Four),
            6 => Ok(SequenceNumberWidth::Six),
            other => Err(Error::UnsupportedWidth(other)),
        }
    }

    /// Largest value that can be written at this width.
    #[inline]
    pub const fn max_value(self) -> SequenceNumber {
        (1u64 << (self.bytes() * 8)) - 1
    }
}

impl TryFrom<usize> for SequenceNumberWidth {
    type Error = Error;

    fn try_from(bytes: usize) -> Result<Self> {
        Self::from_bytes(bytes)
    }
}

impl TryFrom<u8> for SequenceNumberWidth {
    type Error = Error;

    fn try_from(bytes: u8) -> Result<Self> {
        Self::from_bytes(bytes as usize)
    }
}

impl From<SequenceNumberWidth> for u8 {
    fn from(width: SequenceNumberWidth) -> u8 {
        width.bytes() as u8
    }
}
