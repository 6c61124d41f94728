//! Frame Codec Error Types
//!
//! Every failure is returned to the immediate caller. The codec has no notion
//! of partial recovery: a malformed or truncated frame invalidates the rest of
//! the packet payload, and the connection layer decides whether to drop the
//! packet or close the connection.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type for frame codec operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced while decoding or encoding frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Fewer bytes remain than the current field or section requires.
    ///
    /// Checked before every read. A frame is never returned partially.
    #[error("truncated input: need {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    /// The type byte matches no fixed frame type and no flagged range.
    #[error("unknown frame type 0x{0:02x}")]
    UnknownFrameType(u8),

    /// A STOP_WAITING frame was decoded or encoded without the out-of-band
    /// least-unacked width from the connection layer.
    #[error("stop-waiting frame requires an out-of-band sequence number width")]
    MissingWidthConfiguration,

    /// The caller-provided output buffer cannot hold the encoded frame.
    #[error("output buffer too small: need {needed} bytes, {available} available")]
    OutputBufferTooSmall { needed: usize, available: usize },

    /// An in-memory value does not fit the wire width it must be written at.
    #[error("value 0x{value:x} does not fit in {width} bytes")]
    FieldOverflow { value: u64, width: usize },

    /// A repeated section has more entries than its one-byte count can carry.
    #[error("{section} holds {count} entries, at most 255 allowed")]
    SectionTooLong { section: &'static str, count: usize },

    /// A raw sequence number width outside {1, 2, 4, 6}.
    #[error("unsupported sequence number width: {0} bytes")]
    UnsupportedWidth(usize),
}

impl Error {
    /// Returns true if the input ended before the frame layout did.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::TruncatedInput { .. })
    }

    /// Returns true for errors that can only come out of the encode path.
    pub fn is_encode_error(&self) -> bool {
        matches!(
            self,
            Error::OutputBufferTooSmall { .. }
                | Error::FieldOverflow { .. }
                | Error::SectionTooLong { .. }
        )
    }
}
