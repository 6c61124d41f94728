//! # Variable-Width Fields
//!
//! Nearly every frame field is an unsigned little-endian integer whose byte
//! count is chosen per field from a small lookup table, never a fixed word
//! size. The tables live here and only here:
//!
//! ```text
//! sequence number  selector 0..=3  ->  1, 2, 4, 6 bytes
//! stream id        selector 0..=3  ->  1, 2, 3, 4 bytes
//! byte offset      selector 0..=7  ->  0, 2, 3, 4, 5, 6, 7, 8 bytes
//! ```
//!
//! Decode maps a selector taken from the type byte to a byte count. Encode
//! runs the table in reverse: the smallest entry that can hold the value
//! gives both the byte count and the selector bits to set.
//!
//! [`WireReader`] and [`WireWriter`] are the running cursors used by the
//! per-kind layout code. Every read and write is bounds-checked against the
//! remaining bytes before it touches the buffer.

#![forbid(unsafe_code)]

use crate::error::{Error, Result};
use bytes::{Buf, BufMut};

// ============================================================================
// Width Tables
// ============================================================================

/// Ascending table of permitted byte widths for one field kind.
///
/// The table length is a power of two; a selector is an index into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthTable {
    widths: &'static [usize],
}

/// Sequence numbers: largest observed, missing-range deltas.
pub const SEQUENCE_NUMBER_WIDTHS: WidthTable = WidthTable::new(&[1, 2, 4, 6]);

/// Stream identifiers in STREAM frames.
pub const STREAM_ID_WIDTHS: WidthTable = WidthTable::new(&[1, 2, 3, 4]);

/// Byte offsets in STREAM frames. Width 0 means the field is absent.
pub const BYTE_OFFSET_WIDTHS: WidthTable = WidthTable::new(&[0, 2, 3, 4, 5, 6, 7, 8]);

impl WidthTable {
    pub const fn new(widths: &'static [usize]) -> Self {
        Self { widths }
    }

    /// Mask covering the selector bits (0b11 or 0b111).
    #[inline]
    pub const fn selector_mask(&self) -> u8 {
        (self.widths.len() - 1) as u8
    }

    /// Byte count for a selector. Bits above the mask are ignored.
    #[inline]
    pub fn width(&self, selector: u8) -> usize {
        self.widths[(selector & self.selector_mask()) as usize]
    }

    /// Selector for an exact byte count, if the table contains it.
    pub fn selector(&self, width: usize) -> Option<u8> {
        self.widths
            .iter()
            .position(|&w| w == width)
            .map(|index| index as u8)
    }

    /// Smallest (selector, width) pair that can hold `value`.
    ///
    /// Used exclusively during encode.
    pub fn smallest(&self, value: u64) -> Result<(u8, usize)> {
        self.widths
            .iter()
            .position(|&w| fits(value, w))
            .map(|index| (index as u8, self.widths[index]))
            .ok_or_else(|| Error::FieldOverflow {
                value,
                width: self.widest(),
            })
    }

    /// Widest entry of the table.
    #[inline]
    pub fn widest(&self) -> usize {
        self.widths[self.widths.len() - 1]
    }
}

/// Returns true if `value` can be written in `width` bytes.
#[inline]
pub const fn fits(value: u64, width: usize) -> bool {
    width >= 8 || value >> (width * 8) == 0
}

// ============================================================================
// Field Reader / Writer
// ============================================================================

/// Read `byte_count` little-endian bytes starting at `offset`.
///
/// A zero-byte field reads as 0 without touching the buffer.
///
/// # Errors
/// `TruncatedInput` if fewer than `byte_count` bytes remain after `offset`.
pub fn read_width_field(buf: &[u8], offset: usize, byte_count: usize) -> Result<u64> {
    debug_assert!(byte_count <= 8);
    let available = buf.len().saturating_sub(offset);
    if available < byte_count {
        return Err(Error::TruncatedInput {
            needed: byte_count,
            available,
        });
    }
    if byte_count == 0 {
        return Ok(0);
    }

    let mut field = &buf[offset..offset + byte_count];
    Ok(field.get_uint_le(byte_count))
}

/// Write the low `byte_count` bytes of `value` at `offset`, little-endian.
///
/// Returns the number of bytes written.
///
/// # Errors
/// - `FieldOverflow` if `value` needs more than `byte_count` bytes
/// - `OutputBufferTooSmall` if the buffer ends before the field does
pub fn write_width_field(
    buf: &mut [u8],
    offset: usize,
    value: u64,
    byte_count: usize,
) -> Result<usize> {
    debug_assert!(byte_count <= 8);
    if !fits(value, byte_count) {
        return Err(Error::FieldOverflow {
            value,
            width: byte_count,
        });
    }
    let available = buf.len().saturating_sub(offset);
    if available < byte_count {
        return Err(Error::OutputBufferTooSmall {
            needed: byte_count,
            available,
        });
    }
    if byte_count > 0 {
        let mut field = &mut buf[offset..offset + byte_count];
        field.put_uint_le(value, byte_count);
    }
    Ok(byte_count)
}

/// Decode cursor over one frame's bytes.
///
/// Slices handed out borrow from the input buffer.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_width(&mut self, byte_count: usize) -> Result<u64> {
        let value = read_width_field(self.buf, self.pos, byte_count)?;
        self.pos += byte_count;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_width(1)? as u8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_width(2)? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_width(4)? as u32)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_width(8)
    }

    /// Borrow the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::TruncatedInput {
                needed: len,
                available: self.remaining(),
            });
        }
        let buf: &'a [u8] = self.buf;
        let bytes = &buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Borrow everything that is left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let buf: &'a [u8] = self.buf;
        let rest = &buf[self.pos..];
        self.pos = buf.len();
        rest
    }
}

/// Encode cursor over a caller-provided output buffer.
#[derive(Debug)]
pub struct WireWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> WireWriter<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn write_width(&mut self, value: u64, byte_count: usize) -> Result<()> {
        self.pos += write_width_field(self.buf, self.pos, value, byte_count)?;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_width(value as u64, 1)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_width(value as u64, 2)
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_width(value as u64, 4)
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_width(value, 8)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len())?;
        let mut out = &mut self.buf[self.pos..];
        out.put_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn write_zeros(&mut self, len: usize) -> Result<()> {
        self.ensure(len)?;
        let mut out = &mut self.buf[self.pos..];
        out.put_bytes(0, len);
        self.pos += len;
        Ok(())
    }

    fn ensure(&self, len: usize) -> Result<()> {
        if self.remaining() < len {
            return Err(Error::OutputBufferTooSmall {
                needed: len,
                available: self.remaining(),
            });
        }
        Ok(())
    }
}
