//! # Frame Types
//!
//! Type byte layout, the dispatcher that classifies it, and the typed frame
//! representation.
//!
//! ## Type Byte Layout
//!
//! ```text
//! 0x00 - 0x07   fixed control frames, no embedded bits
//! 0x08 - 0x3f   unassigned
//! 0x40 - 0x7f   ACK     01nt llmm
//!                 n  = NACK section present
//!                 t  = truncated
//!                 ll = largest observed width selector
//!                 mm = missing packet delta width selector
//! 0x80 - 0xff   STREAM  1fdo ooss
//!                 f   = FIN
//!                 d   = data length present
//!                 ooo = byte offset width selector
//!                 ss  = stream id width selector
//! ```
//!
//! ## Zero-Copy Design
//!
//! Stream payloads and reason phrases borrow from the decoded buffer via the
//! `'a` lifetime.

#![forbid(unsafe_code)]

use crate::error::{Error, Result};
use crate::types::{ByteOffset, ErrorCode, SequenceNumber, StreamId};
use crate::width::{BYTE_OFFSET_WIDTHS, SEQUENCE_NUMBER_WIDTHS, STREAM_ID_WIDTHS};

/// Fixed Frame Type Values
pub const FRAME_TYPE_PADDING: u8 = 0x00;
pub const FRAME_TYPE_RST_STREAM: u8 = 0x01;
pub const FRAME_TYPE_CONNECTION_CLOSE: u8 = 0x02;
pub const FRAME_TYPE_GOAWAY: u8 = 0x03;
pub const FRAME_TYPE_WINDOW_UPDATE: u8 = 0x04;
pub const FRAME_TYPE_BLOCKED: u8 = 0x05;
pub const FRAME_TYPE_STOP_WAITING: u8 = 0x06;
pub const FRAME_TYPE_PING: u8 = 0x07;

/// Flagged Frame Type Ranges
///
/// ACK occupies `01xx_xxxx`, STREAM occupies `1xxx_xxxx`.
pub const FRAME_TYPE_ACK: u8 = 0x40;
pub const FRAME_TYPE_ACK_MASK: u8 = 0xc0;
pub const FRAME_TYPE_STREAM: u8 = 0x80;
pub const FRAME_TYPE_STREAM_MASK: u8 = 0x80;

/// STREAM Frame Flag Bits
pub const STREAM_FLAG_FIN: u8 = 0x40;
pub const STREAM_FLAG_DATA_LENGTH: u8 = 0x20;
pub const STREAM_OFFSET_SELECTOR_SHIFT: u8 = 2;
pub const STREAM_ID_SELECTOR_SHIFT: u8 = 0;

/// ACK Frame Flag Bits
pub const ACK_FLAG_NACK: u8 = 0x20;
pub const ACK_FLAG_TRUNCATED: u8 = 0x10;
pub const ACK_LARGEST_OBSERVED_SELECTOR_SHIFT: u8 = 2;
pub const ACK_MISSING_DELTA_SELECTOR_SHIFT: u8 = 0;

/// Maximum entries in any repeated section (one-byte count prefix).
pub const MAX_SECTION_ENTRIES: usize = u8::MAX as usize;

// ============================================================================
// Type/Flags Dispatcher
// ============================================================================

/// Bits embedded in a STREAM type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTypeBits {
    pub fin: bool,
    pub data_length: bool,
    /// Byte offset width selector (3 bits)
    pub offset_selector: u8,
    /// Stream id width selector (2 bits)
    pub stream_id_selector: u8,
}

impl StreamTypeBits {
    #[inline]
    pub fn stream_id_width(&self) -> usize {
        STREAM_ID_WIDTHS.width(self.stream_id_selector)
    }

    #[inline]
    pub fn offset_width(&self) -> usize {
        BYTE_OFFSET_WIDTHS.width(self.offset_selector)
    }
}

/// Bits embedded in an ACK type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckTypeBits {
    pub nack: bool,
    pub truncated: bool,
    /// Largest observed width selector (2 bits)
    pub largest_observed_selector: u8,
    /// Missing packet delta width selector (2 bits)
    pub missing_delta_selector: u8,
}

impl AckTypeBits {
    #[inline]
    pub fn largest_observed_width(&self) -> usize {
        SEQUENCE_NUMBER_WIDTHS.width(self.largest_observed_selector)
    }

    #[inline]
    pub fn missing_delta_width(&self) -> usize {
        SEQUENCE_NUMBER_WIDTHS.width(self.missing_delta_selector)
    }
}

/// Result of classifying a type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Padding,
    RstStream,
    ConnectionClose,
    Goaway,
    WindowUpdate,
    Blocked,
    StopWaiting,
    Ping,
    Ack(AckTypeBits),
    Stream(StreamTypeBits),
}

impl FrameType {
    /// Classify the first byte of a frame.
    ///
    /// # Errors
    /// `UnknownFrameType` for `0x08..=0x3f`.
    pub fn dispatch(byte: u8) -> Result<Self> {
        if byte & FRAME_TYPE_STREAM_MASK == FRAME_TYPE_STREAM {
            return Ok(FrameType::Stream(StreamTypeBits {
                fin: byte & STREAM_FLAG_FIN != 0,
                data_length: byte & STREAM_FLAG_DATA_LENGTH != 0,
                offset_selector: (byte >> STREAM_OFFSET_SELECTOR_SHIFT)
                    & BYTE_OFFSET_WIDTHS.selector_mask(),
                stream_id_selector: (byte >> STREAM_ID_SELECTOR_SHIFT)
                    & STREAM_ID_WIDTHS.selector_mask(),
            }));
        }

        if byte & FRAME_TYPE_ACK_MASK == FRAME_TYPE_ACK {
            return Ok(FrameType::Ack(AckTypeBits {
                nack: byte & ACK_FLAG_NACK != 0,
                truncated: byte & ACK_FLAG_TRUNCATED != 0,
                largest_observed_selector: (byte >> ACK_LARGEST_OBSERVED_SELECTOR_SHIFT)
                    & SEQUENCE_NUMBER_WIDTHS.selector_mask(),
                missing_delta_selector: (byte >> ACK_MISSING_DELTA_SELECTOR_SHIFT)
                    & SEQUENCE_NUMBER_WIDTHS.selector_mask(),
            }));
        }

        match byte {
            FRAME_TYPE_PADDING => Ok(FrameType::Padding),
            FRAME_TYPE_RST_STREAM => Ok(FrameType::RstStream),
            FRAME_TYPE_CONNECTION_CLOSE => Ok(FrameType::ConnectionClose),
            FRAME_TYPE_GOAWAY => Ok(FrameType::Goaway),
            FRAME_TYPE_WINDOW_UPDATE => Ok(FrameType::WindowUpdate),
            FRAME_TYPE_BLOCKED => Ok(FrameType::Blocked),
            FRAME_TYPE_STOP_WAITING => Ok(FrameType::StopWaiting),
            FRAME_TYPE_PING => Ok(FrameType::Ping),
            other => Err(Error::UnknownFrameType(other)),
        }
    }

    /// Pack back into a type byte. Inverse of [`FrameType::dispatch`].
    pub fn to_byte(&self) -> u8 {
        match self {
            FrameType::Padding => FRAME_TYPE_PADDING,
            FrameType::RstStream => FRAME_TYPE_RST_STREAM,
            FrameType::ConnectionClose => FRAME_TYPE_CONNECTION_CLOSE,
            FrameType::Goaway => FRAME_TYPE_GOAWAY,
            FrameType::WindowUpdate => FRAME_TYPE_WINDOW_UPDATE,
            FrameType::Blocked => FRAME_TYPE_BLOCKED,
            FrameType::StopWaiting => FRAME_TYPE_STOP_WAITING,
            FrameType::Ping => FRAME_TYPE_PING,
            FrameType::Ack(bits) => {
                let mut byte = FRAME_TYPE_ACK;
                if bits.nack {
                    byte |= ACK_FLAG_NACK;
                }
                if bits.truncated {
                    byte |= ACK_FLAG_TRUNCATED;
                }
                byte |= (bits.largest_observed_selector & SEQUENCE_NUMBER_WIDTHS.selector_mask())
                    << ACK_LARGEST_OBSERVED_SELECTOR_SHIFT;
                byte |= (bits.missing_delta_selector & SEQUENCE_NUMBER_WIDTHS.selector_mask())
                    << ACK_MISSING_DELTA_SELECTOR_SHIFT;
                byte
            }
            FrameType::Stream(bits) => {
                let mut byte = FRAME_TYPE_STREAM;
                if bits.fin {
                    byte |= STREAM_FLAG_FIN;
                }
                if bits.data_length {
                    byte |= STREAM_FLAG_DATA_LENGTH;
                }
                byte |= (bits.offset_selector & BYTE_OFFSET_WIDTHS.selector_mask())
                    << STREAM_OFFSET_SELECTOR_SHIFT;
                byte |= (bits.stream_id_selector & STREAM_ID_WIDTHS.selector_mask())
                    << STREAM_ID_SELECTOR_SHIFT;
                byte
            }
        }
    }
}

// ============================================================================
// Frame Structures
// ============================================================================

/// PADDING Frame
///
/// Fills the rest of the packet payload. `length` counts the bytes after the
/// type byte; their content is not inspected on decode and written as zeros
/// on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaddingFrame {
    pub length: usize,
}

/// RST_STREAM Frame
///
/// Abruptly terminates a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RstStreamFrame {
    pub stream_id: StreamId,

    /// Final byte offset of the stream
    pub byte_offset: ByteOffset,

    pub error_code: ErrorCode,
}

/// CONNECTION_CLOSE Frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionCloseFrame<'a> {
    pub error_code: ErrorCode,

    /// Reason phrase (may be empty)
    pub reason: &'a [u8],
}

/// GOAWAY Frame
///
/// Announces that the peer will stop using the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoawayFrame<'a> {
    pub error_code: ErrorCode,

    /// Last stream the sender acted on
    pub last_good_stream_id: StreamId,

    /// Reason phrase (may be empty)
    pub reason: &'a [u8],
}

/// WINDOW_UPDATE Frame
///
/// Raises the flow control window of a stream (or the connection, stream 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUpdateFrame {
    pub stream_id: StreamId,

    /// New absolute byte offset the peer may send up to
    pub byte_offset: ByteOffset,
}

/// BLOCKED Frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedFrame {
    pub stream_id: StreamId,
}

/// STOP_WAITING Frame
///
/// Tells the peer to stop waiting for packets below a sequence number. The
/// delta is written at a width the connection layer supplies out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopWaitingFrame {
    pub entropy_hash: u8,

    /// Delta from the enclosing packet's sequence number to the least unacked
    pub least_unacked_delta: SequenceNumber,
}

/// STREAM Frame
///
/// Carries application data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFrame<'a> {
    pub stream_id: StreamId,

    /// Offset of `data` within the stream (0 if absent on the wire)
    pub offset: ByteOffset,

    /// FIN bit: last frame of the stream
    pub fin: bool,

    /// Data length field present. When false `data` runs to the end of the
    /// payload, so such a frame must be the last one in its packet.
    pub data_length_present: bool,

    /// Stream data (lifetime-bound reference to packet buffer)
    pub data: &'a [u8],
}

impl StreamFrame<'_> {
    /// Type byte bits with the narrowest stream id and offset widths.
    pub fn type_bits(&self) -> Result<StreamTypeBits> {
        let (stream_id_selector, _) = STREAM_ID_WIDTHS.smallest(self.stream_id as u64)?;
        let (offset_selector, _) = BYTE_OFFSET_WIDTHS.smallest(self.offset)?;
        Ok(StreamTypeBits {
            fin: self.fin,
            data_length: self.data_length_present,
            offset_selector,
            stream_id_selector,
        })
    }
}

/// First entry of the ACK timestamp section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FirstTimestamp {
    pub delta_from_largest_observed: u8,

    /// Time since the largest observed packet (4 bytes on the wire)
    pub time_since_largest_observed: u32,
}

/// Subsequent entry of the ACK timestamp section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubsequentTimestamp {
    pub delta_from_largest_observed: u8,

    /// Time since the previous timestamp (2 bytes on the wire)
    pub time_since_previous: u16,
}

/// ACK timestamp section, present when the timestamp count is non-zero.
///
/// The first entry uses a 4-byte absolute time, subsequent entries a 2-byte
/// relative time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReceivedTimestamps {
    pub first: FirstTimestamp,

    /// At most 254 entries (the count byte includes `first`)
    pub subsequent: tinyvec::TinyVec<[SubsequentTimestamp; 8]>,
}

impl ReceivedTimestamps {
    /// Value of the timestamp count byte.
    pub fn count(&self) -> usize {
        1 + self.subsequent.len()
    }
}

/// One missing packet range of the NACK section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissingRange {
    /// Delta to the missing packet, at the width selected in the type byte
    pub sequence_number_delta: SequenceNumber,

    pub range_length: u8,
}

/// NACK section of an ACK frame, present iff the NACK flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NackSection {
    /// At most 255 entries
    pub missing_ranges: tinyvec::TinyVec<[MissingRange; 8]>,

    /// At most 255 entries, each a fixed 2 bytes on the wire
    pub revived_packets: tinyvec::TinyVec<[SequenceNumber; 8]>,
}

/// ACK Frame
///
/// Strictly ordered sections: entropy hash, largest observed and its delay,
/// optional timestamps, optional NACK section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AckFrame {
    pub entropy_hash: u8,

    /// Largest sequence number observed by the receiver
    pub largest_observed: SequenceNumber,

    /// Time elapsed since the largest observed packet was received
    pub largest_observed_delta_time: u16,

    /// `None` encodes as a zero timestamp count
    pub timestamps: Option<ReceivedTimestamps>,

    /// TRUNCATED flag from the type byte
    pub truncated: bool,

    /// `None` means the NACK flag is clear and no NACK bytes exist
    pub nack: Option<NackSection>,
}

impl AckFrame {
    /// Value of the timestamp count byte.
    pub fn timestamp_count(&self) -> usize {
        self.timestamps.as_ref().map_or(0, ReceivedTimestamps::count)
    }

    /// Largest missing-range delta, 0 without a NACK section.
    pub fn largest_missing_delta(&self) -> SequenceNumber {
        self.nack
            .as_ref()
            .and_then(|nack| {
                nack.missing_ranges
                    .iter()
                    .map(|range| range.sequence_number_delta)
                    .max()
            })
            .unwrap_or(0)
    }

    /// Type byte bits with the narrowest widths that hold the largest
    /// observed and every missing-range delta.
    pub fn type_bits(&self) -> Result<AckTypeBits> {
        let (largest_observed_selector, _) =
            SEQUENCE_NUMBER_WIDTHS.smallest(self.largest_observed)?;
        let (missing_delta_selector, _) =
            SEQUENCE_NUMBER_WIDTHS.smallest(self.largest_missing_delta())?;
        Ok(AckTypeBits {
            nack: self.nack.is_some(),
            truncated: self.truncated,
            largest_observed_selector,
            missing_delta_selector,
        })
    }
}

/// Unified Frame Type
///
/// Discriminated union of all frame kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    /// PADDING frame (0x00)
    Padding(PaddingFrame),

    /// RST_STREAM frame (0x01)
    RstStream(RstStreamFrame),

    /// CONNECTION_CLOSE frame (0x02)
    ConnectionClose(ConnectionCloseFrame<'a>),

    /// GOAWAY frame (0x03)
    Goaway(GoawayFrame<'a>),

    /// WINDOW_UPDATE frame (0x04)
    WindowUpdate(WindowUpdateFrame),

    /// BLOCKED frame (0x05)
    Blocked(BlockedFrame),

    /// STOP_WAITING frame (0x06)
    StopWaiting(StopWaitingFrame),

    /// PING frame (0x07)
    Ping,

    /// ACK frame (0x40-0x7f)
    Ack(AckFrame),

    /// STREAM frame (0x80-0xff)
    Stream(StreamFrame<'a>),
}

impl<'a> Frame<'a> {
    /// Canonical type byte for this frame.
    ///
    /// Width selectors are recomputed from the field values, so this is the
    /// byte the serializer writes.
    ///
    /// # Errors
    /// `FieldOverflow` if a width-selected value exceeds its table.
    pub fn frame_type(&self) -> Result<FrameType> {
        Ok(match self {
            Frame::Padding(_) => FrameType::Padding,
            Frame::RstStream(_) => FrameType::RstStream,
            Frame::ConnectionClose(_) => FrameType::ConnectionClose,
            Frame::Goaway(_) => FrameType::Goaway,
            Frame::WindowUpdate(_) => FrameType::WindowUpdate,
            Frame::Blocked(_) => FrameType::Blocked,
            Frame::StopWaiting(_) => FrameType::StopWaiting,
            Frame::Ping => FrameType::Ping,
            Frame::Ack(ack) => FrameType::Ack(ack.type_bits()?),
            Frame::Stream(stream) => FrameType::Stream(stream.type_bits()?),
        })
    }

    /// Short lowercase name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Frame::Padding(_) => "padding",
            Frame::RstStream(_) => "rst_stream",
            Frame::ConnectionClose(_) => "connection_close",
            Frame::Goaway(_) => "goaway",
            Frame::WindowUpdate(_) => "window_update",
            Frame::Blocked(_) => "blocked",
            Frame::StopWaiting(_) => "stop_waiting",
            Frame::Ping => "ping",
            Frame::Ack(_) => "ack",
            Frame::Stream(_) => "stream",
        }
    }

    /// Returns true if this frame must be retransmitted when lost.
    ///
    /// PADDING, ACK and STOP_WAITING are regenerated from current state
    /// instead.
    pub fn is_retransmittable(&self) -> bool {
        !matches!(
            self,
            Frame::Padding(_) | Frame::Ack(_) | Frame::StopWaiting(_)
        )
    }

    /// Returns true if receiving this frame obliges the peer to acknowledge.
    pub fn is_ack_eliciting(&self) -> bool {
        self.is_retransmittable()
    }
}
