//! # Frame Serialization
//!
//! Encodes typed frames into caller-provided buffers.
//!
//! Width selectors are never taken from the caller: the serializer picks the
//! narrowest width that holds each value and sets the type byte bits to
//! match. All validation runs before the first byte is written, so a failed
//! call leaves the output buffer untouched.

#![forbid(unsafe_code)]

use super::types::*;
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::types::SequenceNumberWidth;
use crate::width::WireWriter;
use bytes::BytesMut;
use tracing::debug;

/// Wire width of ACK revived packets.
const REVIVED_PACKET_WIDTH: usize = 2;

/// Frame Serializer Trait
pub trait FrameSerializer {
    /// Serialize a frame into `buf`, starting at index 0.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    /// `OutputBufferTooSmall` if `buf` is shorter than [`frame_size`], plus
    /// any validation error [`frame_size`] reports.
    ///
    /// [`frame_size`]: FrameSerializer::frame_size
    fn serialize_frame(&self, frame: &Frame<'_>, buf: &mut [u8]) -> Result<usize>;

    /// Calculate the serialized size of a frame
    ///
    /// Used for pre-allocation and packet size planning. Fails with the same
    /// validation errors as [`FrameSerializer::serialize_frame`].
    fn frame_size(&self, frame: &Frame<'_>) -> Result<usize>;

    /// Append a frame to a growable buffer.
    fn serialize_into(&self, frame: &Frame<'_>, buf: &mut BytesMut) -> Result<usize> {
        let start = buf.len();
        let size = self.frame_size(frame)?;
        let end = start.checked_add(size).ok_or(Error::OutputBufferTooSmall {
            needed: size,
            available: usize::MAX - start,
        })?;
        buf.resize(end, 0);

        match self.serialize_frame(frame, &mut buf[start..]) {
            Ok(written) => {
                buf.truncate(start + written);
                Ok(written)
            }
            Err(e) => {
                buf.truncate(start);
                Err(e)
            }
        }
    }
}

/// Default frame serializer implementation
///
/// Carries the out-of-band STOP_WAITING width, mirroring
/// [`super::DefaultFrameParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultFrameSerializer {
    least_unacked_width: Option<SequenceNumberWidth>,
}

impl DefaultFrameSerializer {
    pub const fn new() -> Self {
        Self {
            least_unacked_width: None,
        }
    }

    pub const fn with_least_unacked_width(width: SequenceNumberWidth) -> Self {
        Self {
            least_unacked_width: Some(width),
        }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            least_unacked_width: config.least_unacked_width,
        }
    }

    pub fn least_unacked_width(&self) -> Option<SequenceNumberWidth> {
        self.least_unacked_width
    }
}

impl FrameSerializer for DefaultFrameSerializer {
    fn serialize_frame(&self, frame: &Frame<'_>, buf: &mut [u8]) -> Result<usize> {
        let size = self.frame_size(frame)?;
        if buf.len() < size {
            return Err(Error::OutputBufferTooSmall {
                needed: size,
                available: buf.len(),
            });
        }

        let mut writer = WireWriter::new(buf);

        match frame {
            Frame::Padding(padding) => {
                writer.write_u8(FRAME_TYPE_PADDING)?;
                writer.write_zeros(padding.length)?;
            }

            Frame::Ping => {
                writer.write_u8(FRAME_TYPE_PING)?;
            }

            Frame::RstStream(rst) => {
                writer.write_u8(FRAME_TYPE_RST_STREAM)?;
                writer.write_u32(rst.stream_id)?;
                writer.write_u64(rst.byte_offset)?;
                writer.write_u32(rst.error_code)?;
            }

            Frame::ConnectionClose(close) => {
                writer.write_u8(FRAME_TYPE_CONNECTION_CLOSE)?;
                writer.write_u32(close.error_code)?;
                Self::serialize_reason_phrase(close.reason, &mut writer)?;
            }

            Frame::Goaway(goaway) => {
                writer.write_u8(FRAME_TYPE_GOAWAY)?;
                writer.write_u32(goaway.error_code)?;
                writer.write_u32(goaway.last_good_stream_id)?;
                Self::serialize_reason_phrase(goaway.reason, &mut writer)?;
            }

            Frame::WindowUpdate(update) => {
                writer.write_u8(FRAME_TYPE_WINDOW_UPDATE)?;
                writer.write_u32(update.stream_id)?;
                writer.write_u64(update.byte_offset)?;
            }

            Frame::Blocked(blocked) => {
                writer.write_u8(FRAME_TYPE_BLOCKED)?;
                writer.write_u32(blocked.stream_id)?;
            }

            Frame::StopWaiting(stop) => {
                let width = self.stop_waiting_width()?;
                writer.write_u8(FRAME_TYPE_STOP_WAITING)?;
                writer.write_u8(stop.entropy_hash)?;
                writer.write_width(stop.least_unacked_delta, width.bytes())?;
            }

            Frame::Ack(ack) => Self::serialize_ack_frame(ack, &mut writer)?,

            Frame::Stream(stream) => Self::serialize_stream_frame(stream, &mut writer)?,
        }

        Ok(writer.position())
    }

    fn frame_size(&self, frame: &Frame<'_>) -> Result<usize> {
        self.checked_frame_size(frame).map_err(|e| {
            debug!(kind = frame.name(), error = %e, "frame rejected for encoding");
            e
        })
    }
}

impl DefaultFrameSerializer {
    fn stop_waiting_width(&self) -> Result<SequenceNumberWidth> {
        self.least_unacked_width
            .ok_or(Error::MissingWidthConfiguration)
    }

    /// Exact encoded size after validating every field against its width.
    fn checked_frame_size(&self, frame: &Frame<'_>) -> Result<usize> {
        Ok(match frame {
            Frame::Padding(padding) => {
                padding
                    .length
                    .checked_add(1)
                    .ok_or(Error::FieldOverflow {
                        value: padding.length as u64,
                        width: core::mem::size_of::<usize>(),
                    })?
            }

            Frame::Ping => 1,

            // type + stream id + byte offset + error code
            Frame::RstStream(_) => 1 + 4 + 8 + 4,

            Frame::ConnectionClose(close) => {
                check_length_prefix(close.reason.len())?;
                1 + 4 + 2 + close.reason.len()
            }

            Frame::Goaway(goaway) => {
                check_length_prefix(goaway.reason.len())?;
                1 + 4 + 4 + 2 + goaway.reason.len()
            }

            Frame::WindowUpdate(_) => 1 + 4 + 8,

            Frame::Blocked(_) => 1 + 4,

            Frame::StopWaiting(stop) => {
                let width = self.stop_waiting_width()?;
                if stop.least_unacked_delta > width.max_value() {
                    return Err(Error::FieldOverflow {
                        value: stop.least_unacked_delta,
                        width: width.bytes(),
                    });
                }
                1 + 1 + width.bytes()
            }

            Frame::Ack(ack) => Self::ack_frame_size(ack)?,

            Frame::Stream(stream) => {
                let bits = stream.type_bits()?;
                let mut size = 1 + bits.stream_id_width() + bits.offset_width();
                if stream.data_length_present {
                    check_length_prefix(stream.data.len())?;
                    size += 2;
                }
                size + stream.data.len()
            }
        })
    }

    fn ack_frame_size(ack: &AckFrame) -> Result<usize> {
        let bits = ack.type_bits()?;

        // type + entropy + largest observed + delta time + timestamp count
        let mut size = 1 + 1 + bits.largest_observed_width() + 2 + 1;

        if let Some(timestamps) = &ack.timestamps {
            check_section("timestamps", timestamps.count())?;
            size += (1 + 4) + timestamps.subsequent.len() * (1 + 2);
        }

        if let Some(nack) = &ack.nack {
            check_section("missing ranges", nack.missing_ranges.len())?;
            check_section("revived packets", nack.revived_packets.len())?;
            if let Some(&value) = nack
                .revived_packets
                .iter()
                .find(|&&packet| packet > u16::MAX as u64)
            {
                return Err(Error::FieldOverflow {
                    value,
                    width: REVIVED_PACKET_WIDTH,
                });
            }

            size += 1 + nack.missing_ranges.len() * (bits.missing_delta_width() + 1);
            size += 1 + nack.revived_packets.len() * REVIVED_PACKET_WIDTH;
        }

        Ok(size)
    }

    fn serialize_reason_phrase(reason: &[u8], writer: &mut WireWriter<'_>) -> Result<()> {
        writer.write_u16(reason.len() as u16)?;
        writer.write_bytes(reason)
    }

    fn serialize_stream_frame(stream: &StreamFrame<'_>, writer: &mut WireWriter<'_>) -> Result<()> {
        let bits = stream.type_bits()?;
        writer.write_u8(FrameType::Stream(bits).to_byte())?;
        writer.write_width(stream.stream_id as u64, bits.stream_id_width())?;
        writer.write_width(stream.offset, bits.offset_width())?;
        if stream.data_length_present {
            writer.write_u16(stream.data.len() as u16)?;
        }
        writer.write_bytes(stream.data)
    }

    fn serialize_ack_frame(ack: &AckFrame, writer: &mut WireWriter<'_>) -> Result<()> {
        let bits = ack.type_bits()?;
        writer.write_u8(FrameType::Ack(bits).to_byte())?;
        writer.write_u8(ack.entropy_hash)?;
        writer.write_width(ack.largest_observed, bits.largest_observed_width())?;
        writer.write_u16(ack.largest_observed_delta_time)?;

        writer.write_u8(ack.timestamp_count() as u8)?;
        if let Some(timestamps) = &ack.timestamps {
            writer.write_u8(timestamps.first.delta_from_largest_observed)?;
            writer.write_u32(timestamps.first.time_since_largest_observed)?;
            for entry in timestamps.subsequent.iter() {
                writer.write_u8(entry.delta_from_largest_observed)?;
                writer.write_u16(entry.time_since_previous)?;
            }
        }

        if let Some(nack) = &ack.nack {
            let delta_width = bits.missing_delta_width();
            writer.write_u8(nack.missing_ranges.len() as u8)?;
            for range in nack.missing_ranges.iter() {
                writer.write_width(range.sequence_number_delta, delta_width)?;
                writer.write_u8(range.range_length)?;
            }

            writer.write_u8(nack.revived_packets.len() as u8)?;
            for &packet in nack.revived_packets.iter() {
                writer.write_width(packet, REVIVED_PACKET_WIDTH)?;
            }
        }

        Ok(())
    }
}

fn check_section(section: &'static str, count: usize) -> Result<()> {
    if count > MAX_SECTION_ENTRIES {
        return Err(Error::SectionTooLong { section, count });
    }
    Ok(())
}

/// Reason phrases and stream data lengths carry a 2-byte length prefix.
fn check_length_prefix(len: usize) -> Result<()> {
    if len > u16::MAX as usize {
        return Err(Error::FieldOverflow {
            value: len as u64,
            width: 2,
        });
    }
    Ok(())
}
