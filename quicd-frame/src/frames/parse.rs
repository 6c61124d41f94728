//! # Frame Parsing
//!
//! Zero-copy frame parsing with iterator-based API.
//!
//! Each call decodes exactly one frame from the start of the buffer and
//! reports how many bytes it consumed. The parser holds no state between
//! calls apart from the out-of-band stop-waiting width it was built with.

#![forbid(unsafe_code)]

extern crate alloc;

use super::types::*;
use crate::config::CodecConfig;
use crate::error::{Error, Result};
use crate::types::SequenceNumberWidth;
use crate::width::WireReader;
use alloc::vec::Vec;
use tracing::{debug, trace};

/// Frame Parser Trait
///
/// Parses frames from a decrypted packet payload. All borrowed frame data
/// references the input buffer via the `'a` lifetime.
pub trait FrameParser {
    /// Parse a single frame from buffer
    ///
    /// Returns parsed frame and number of bytes consumed.
    fn parse_frame<'a>(&self, buf: &'a [u8]) -> Result<(Frame<'a>, usize)>;

    /// Create an iterator over frames in a payload
    fn iter_frames<'a>(&'a self, payload: &'a [u8]) -> FrameIterator<'a, Self>
    where
        Self: Sized,
    {
        FrameIterator {
            parser: self,
            buf: payload,
            offset: 0,
        }
    }

    /// Decode every frame of a payload, failing on the first bad one.
    fn parse_all_frames<'a>(&'a self, payload: &'a [u8]) -> Result<Vec<Frame<'a>>>
    where
        Self: Sized,
    {
        self.iter_frames(payload).collect()
    }
}

/// Frame Iterator (Zero-Copy)
///
/// Walks a packet payload frame by frame. Iteration ends after the first
/// error, since frame boundaries past a malformed frame are unknown.
pub struct FrameIterator<'a, P: FrameParser + ?Sized> {
    parser: &'a P,
    buf: &'a [u8],
    offset: usize,
}

impl<'a, P: FrameParser + ?Sized> FrameIterator<'a, P> {
    /// Bytes of the payload consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a, P: FrameParser + ?Sized> Iterator for FrameIterator<'a, P> {
    type Item = Result<Frame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.buf.len() {
            return None;
        }

        match self.parser.parse_frame(&self.buf[self.offset..]) {
            Ok((frame, consumed)) => {
                trace!(
                    offset = self.offset,
                    consumed,
                    kind = frame.name(),
                    "decoded frame"
                );
                self.offset += consumed;
                Some(Ok(frame))
            }
            Err(e) => {
                debug!(offset = self.offset, error = %e, "frame decode failed");
                // On error, stop iteration
                self.offset = self.buf.len();
                Some(Err(e))
            }
        }
    }
}

// ============================================================================
// Default Frame Parser
// ============================================================================

/// Default frame parser implementation
///
/// `least_unacked_width` is the connection layer's out-of-band width for
/// STOP_WAITING deltas. Without it every STOP_WAITING frame fails with
/// `MissingWidthConfiguration`; all other kinds decode normally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultFrameParser {
    least_unacked_width: Option<SequenceNumberWidth>,
}

impl DefaultFrameParser {
    /// Parser with no stop-waiting width configured.
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

impl FrameParser for DefaultFrameParser {
    fn parse_frame<'a>(&self, buf: &'a [u8]) -> Result<(Frame<'a>, usize)> {
        let mut reader = WireReader::new(buf);
        let frame_type = FrameType::dispatch(reader.read_u8()?)?;

        let frame = match frame_type {
            FrameType::Padding => Frame::Padding(PaddingFrame {
                length: reader.read_rest().len(),
            }),

            FrameType::Ping => Frame::Ping,

            FrameType::RstStream => Frame::RstStream(RstStreamFrame {
                stream_id: reader.read_u32()?,
                byte_offset: reader.read_u64()?,
                error_code: reader.read_u32()?,
            }),

            FrameType::ConnectionClose => {
                let error_code = reader.read_u32()?;
                let reason = Self::parse_reason_phrase(&mut reader)?;
                Frame::ConnectionClose(ConnectionCloseFrame { error_code, reason })
            }

            FrameType::Goaway => {
                let error_code = reader.read_u32()?;
                let last_good_stream_id = reader.read_u32()?;
                let reason = Self::parse_reason_phrase(&mut reader)?;
                Frame::Goaway(GoawayFrame {
                    error_code,
                    last_good_stream_id,
                    reason,
                })
            }

            FrameType::WindowUpdate => Frame::WindowUpdate(WindowUpdateFrame {
                stream_id: reader.read_u32()?,
                byte_offset: reader.read_u64()?,
            }),

            FrameType::Blocked => Frame::Blocked(BlockedFrame {
                stream_id: reader.read_u32()?,
            }),

            FrameType::StopWaiting => {
                Frame::StopWaiting(self.parse_stop_waiting_frame(&mut reader)?)
            }

            FrameType::Ack(bits) => Frame::Ack(Self::parse_ack_frame(bits, &mut reader)?),

            FrameType::Stream(bits) => {
                Frame::Stream(Self::parse_stream_frame(bits, &mut reader)?)
            }
        };

        Ok((frame, reader.position()))
    }
}

impl DefaultFrameParser {
    /// Reason phrase shared by CONNECTION_CLOSE and GOAWAY: 2-byte length,
    /// then that many bytes.
    fn parse_reason_phrase<'a>(reader: &mut WireReader<'a>) -> Result<&'a [u8]> {
        let len = reader.read_u16()? as usize;
        reader.read_bytes(len)
    }

    fn parse_stop_waiting_frame(&self, reader: &mut WireReader<'_>) -> Result<StopWaitingFrame> {
        let width = self
            .least_unacked_width
            .ok_or(Error::MissingWidthConfiguration)?;

        Ok(StopWaitingFrame {
            entropy_hash: reader.read_u8()?,
            least_unacked_delta: reader.read_width(width.bytes())?,
        })
    }

    /// Parse STREAM frame
    ///
    /// Without the data length flag the frame extends to the end of the
    /// payload.
    fn parse_stream_frame<'a>(
        bits: StreamTypeBits,
        reader: &mut WireReader<'a>,
    ) -> Result<StreamFrame<'a>> {
        let stream_id = reader.read_width(bits.stream_id_width())? as u32;
        let offset = reader.read_width(bits.offset_width())?;

        let data = if bits.data_length {
            let len = reader.read_u16()? as usize;
            reader.read_bytes(len)?
        } else {
            reader.read_rest()
        };

        Ok(StreamFrame {
            stream_id,
            offset,
            fin: bits.fin,
            data_length_present: bits.data_length,
            data,
        })
    }

    /// Parse ACK frame
    ///
    /// Sections are strictly ordered; the timestamp block is skipped when its
    /// count is zero and the NACK block exists only when the flag is set.
    fn parse_ack_frame(bits: AckTypeBits, reader: &mut WireReader<'_>) -> Result<AckFrame> {
        let entropy_hash = reader.read_u8()?;
        let largest_observed = reader.read_width(bits.largest_observed_width())?;
        let largest_observed_delta_time = reader.read_u16()?;

        let timestamp_count = reader.read_u8()? as usize;
        let timestamps = if timestamp_count > 0 {
            let first = FirstTimestamp {
                delta_from_largest_observed: reader.read_u8()?,
                time_since_largest_observed: reader.read_u32()?,
            };
            let mut subsequent = tinyvec::TinyVec::new();
            for _ in 1..timestamp_count {
                subsequent.push(SubsequentTimestamp {
                    delta_from_largest_observed: reader.read_u8()?,
                    time_since_previous: reader.read_u16()?,
                });
            }
            Some(ReceivedTimestamps { first, subsequent })
        } else {
            None
        };

        let nack = if bits.nack {
            let delta_width = bits.missing_delta_width();

            let range_count = reader.read_u8()? as usize;
            let mut missing_ranges = tinyvec::TinyVec::new();
            for _ in 0..range_count {
                missing_ranges.push(MissingRange {
                    sequence_number_delta: reader.read_width(delta_width)?,
                    range_length: reader.read_u8()?,
                });
            }

            let revived_count = reader.read_u8()? as usize;
            let mut revived_packets = tinyvec::TinyVec::new();
            for _ in 0..revived_count {
                revived_packets.push(reader.read_u16()? as u64);
            }

            Some(NackSection {
                missing_ranges,
                revived_packets,
            })
        } else {
            None
        };

        Ok(AckFrame {
            entropy_hash,
            largest_observed,
            largest_observed_delta_time,
            timestamps,
            truncated: bits.truncated,
            nack,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(buf: &[u8]) -> Result<(Frame<'_>, usize)> {
        DefaultFrameParser::new().parse_frame(buf)
    }

    fn truncated(needed: usize, available: usize) -> Error {
        Error::TruncatedInput { needed, available }
    }

    mod padding_frame_tests {
        use super::*;

        #[test]
        fn test_padding_consumes_rest() {
            for len in 0..4 {
                let mut buf = vec![0x00];
                buf.extend(std::iter::repeat(0x00).take(len));
                let (frame, consumed) = parse(&buf).unwrap();
                assert_eq!(frame, Frame::Padding(PaddingFrame { length: len }));
                assert_eq!(consumed, len + 1);
            }
        }

        #[test]
        fn test_padding_content_not_inspected() {
            let (frame, consumed) = parse(&[0x00, 0x07, 0xff]).unwrap();
            assert_eq!(frame, Frame::Padding(PaddingFrame { length: 2 }));
            assert_eq!(consumed, 3);
        }
    }

    mod ping_frame_tests {
        use super::*;

        #[test]
        fn test_ping_is_one_byte() {
            let (frame, consumed) = parse(&[0x07, 0x05, 0x12]).unwrap();
            assert_eq!(frame, Frame::Ping);
            assert_eq!(consumed, 1);
        }
    }

    mod fixed_frame_tests {
        use super::*;

        #[test]
        fn test_blocked() {
            let (frame, consumed) = parse(&[0x05, 0x12, 0x34, 0x56, 0x78]).unwrap();
            assert_eq!(frame, Frame::Blocked(BlockedFrame { stream_id: 0x7856_3412 }));
            assert_eq!(consumed, 5);

            assert_eq!(parse(&[0x05, 0x12, 0x34, 0x56]), Err(truncated(4, 3)));
        }

        #[test]
        fn test_window_update() {
            let buf = [
                0x04, 0x12, 0x34, 0x56, 0x78, 0x0a, 0x0b, 0x0c, 0x0d, 0xaa, 0xbb, 0xcc, 0xdd,
            ];
            let (frame, consumed) = parse(&buf).unwrap();
            assert_eq!(
                frame,
                Frame::WindowUpdate(WindowUpdateFrame {
                    stream_id: 0x7856_3412,
                    byte_offset: 0xddcc_bbaa_0d0c_0b0a,
                })
            );
            assert_eq!(consumed, 13);

            assert_eq!(parse(&buf[..12]), Err(truncated(8, 7)));
        }

        #[test]
        fn test_rst_stream() {
            let buf = [
                0x01, 0x12, 0x34, 0x56, 0x78, 0x0a, 0x0b, 0x0c, 0x0d, 0xaa, 0xbb, 0xcc, 0xdd,
                0x11, 0x22, 0x33, 0x44,
            ];
            let (frame, consumed) = parse(&buf).unwrap();
            assert_eq!(
                frame,
                Frame::RstStream(RstStreamFrame {
                    stream_id: 0x7856_3412,
                    byte_offset: 0xddcc_bbaa_0d0c_0b0a,
                    error_code: 0x4433_2211,
                })
            );
            assert_eq!(consumed, 17);

            assert!(parse(&buf[..16]).unwrap_err().is_truncation());
        }
    }

    mod connection_close_frame_tests {
        use super::*;

        #[test]
        fn test_empty_reason() {
            let (frame, consumed) = parse(&[0x02, 0x11, 0x22, 0x33, 0x44, 0x00, 0x00]).unwrap();
            assert_eq!(
                frame,
                Frame::ConnectionClose(ConnectionCloseFrame {
                    error_code: 0x4433_2211,
                    reason: &[],
                })
            );
            assert_eq!(consumed, 7);
        }

        #[test]
        fn test_reason_phrase() {
            let buf = [0x02, 0x11, 0x22, 0x33, 0x44, 0x03, 0x00, 0x1a, 0x2b, 0x3c];
            let (frame, consumed) = parse(&buf).unwrap();
            match frame {
                Frame::ConnectionClose(close) => {
                    assert_eq!(close.error_code, 0x4433_2211);
                    assert_eq!(close.reason, &[0x1a, 0x2b, 0x3c]);
                }
                _ => panic!("Expected ConnectionClose frame"),
            }
            assert_eq!(consumed, 10);
        }

        #[test]
        fn test_reason_longer_than_buffer() {
            assert_eq!(
                parse(&[0x02, 0x11, 0x22, 0x33, 0x44, 0x01, 0x00]),
                Err(truncated(1, 0))
            );
        }
    }

    mod goaway_frame_tests {
        use super::*;

        #[test]
        fn test_error_code_precedes_stream_id() {
            let buf = [
                0x03, 0x11, 0x22, 0x33, 0x44, 0x12, 0x34, 0x56, 0x78, 0x02, 0x00, 0x1a, 0x2b,
            ];
            let (frame, consumed) = parse(&buf).unwrap();
            assert_eq!(
                frame,
                Frame::Goaway(GoawayFrame {
                    error_code: 0x4433_2211,
                    last_good_stream_id: 0x7856_3412,
                    reason: &[0x1a, 0x2b],
                })
            );
            assert_eq!(consumed, 13);
        }

        #[test]
        fn test_truncated_reason() {
            let buf = [0x03, 0x11, 0x22, 0x33, 0x44, 0x12, 0x34, 0x56, 0x78, 0x01, 0x00];
            assert_eq!(parse(&buf), Err(truncated(1, 0)));
        }
    }

    mod stop_waiting_frame_tests {
        use super::*;

        #[test]
        fn test_each_width() {
            let buf = [0x06, 0x42, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
            let cases = [
                (SequenceNumberWidth::One, 0x01),
                (SequenceNumberWidth::Two, 0x0201),
                (SequenceNumberWidth::Four, 0x0403_0201),
                (SequenceNumberWidth::Six, 0x0605_0403_0201),
            ];
            for (width, delta) in cases {
                let parser = DefaultFrameParser::with_least_unacked_width(width);
                let len = 2 + width.bytes();
                let (frame, consumed) = parser.parse_frame(&buf[..len]).unwrap();
                assert_eq!(
                    frame,
                    Frame::StopWaiting(StopWaitingFrame {
                        entropy_hash: 0x42,
                        least_unacked_delta: delta,
                    })
                );
                assert_eq!(consumed, len);
            }
        }

        #[test]
        fn test_requires_width() {
            assert_eq!(
                parse(&[0x06, 0x42, 0x01]),
                Err(Error::MissingWidthConfiguration)
            );
        }

        #[test]
        fn test_truncated_delta() {
            let parser = DefaultFrameParser::with_least_unacked_width(SequenceNumberWidth::One);
            assert_eq!(parser.parse_frame(&[0x06, 0x42]), Err(truncated(1, 0)));
        }

        #[test]
        fn test_from_config() {
            let config = CodecConfig {
                least_unacked_width: Some(SequenceNumberWidth::Four),
            };
            let parser = DefaultFrameParser::from_config(&config);
            assert_eq!(parser.least_unacked_width(), Some(SequenceNumberWidth::Four));
        }
    }

    mod stream_frame_tests {
        use super::*;

        #[test]
        fn test_widest_fields() {
            let buf = [
                0xbf, 0x12, 0x34, 0x56, 0x78, 0x0a, 0x0b, 0x0c, 0x0d, 0xaa, 0xbb, 0xcc, 0xdd,
                0x03, 0x00, 0x42, 0x17, 0x89,
            ];
            let (frame, consumed) = parse(&buf).unwrap();
            assert_eq!(
                frame,
                Frame::Stream(StreamFrame {
                    stream_id: 0x7856_3412,
                    offset: 0xddcc_bbaa_0d0c_0b0a,
                    fin: false,
                    data_length_present: true,
                    data: &[0x42, 0x17, 0x89],
                })
            );
            assert_eq!(consumed, buf.len());
        }

        #[test]
        fn test_absent_offset() {
            // DATA_LENGTH | 16-bit stream id, no offset
            let buf = [0xa1, 0x12, 0x34, 0x03, 0x00, 0x42, 0x17, 0x89];
            let (frame, _) = parse(&buf).unwrap();
            match frame {
                Frame::Stream(stream) => {
                    assert_eq!(stream.stream_id, 0x3412);
                    assert_eq!(stream.offset, 0);
                    assert_eq!(stream.data, &[0x42, 0x17, 0x89]);
                }
                _ => panic!("Expected Stream frame"),
            }
        }

        #[test]
        fn test_data_length_stops_at_declared_length() {
            // trailing PING must not be swallowed
            let buf = [0xad, 0x12, 0x34, 0x0a, 0x0b, 0x0c, 0x0d, 0x01, 0x00, 0x42, 0x07];
            let (frame, consumed) = parse(&buf).unwrap();
            match frame {
                Frame::Stream(stream) => {
                    assert_eq!(stream.offset, 0x0d0c_0b0a);
                    assert_eq!(stream.data, &[0x42]);
                }
                _ => panic!("Expected Stream frame"),
            }
            assert_eq!(consumed, 10);
        }

        #[test]
        fn test_without_data_length_consumes_rest() {
            // FIN | 32-bit offset | 16-bit stream id
            let buf = [0xcd, 0x12, 0x34, 0x0a, 0x0b, 0x0c, 0x0d];
            let (frame, consumed) = parse(&buf).unwrap();
            assert_eq!(
                frame,
                Frame::Stream(StreamFrame {
                    stream_id: 0x3412,
                    offset: 0x0d0c_0b0a,
                    fin: true,
                    data_length_present: false,
                    data: &[],
                })
            );
            assert_eq!(consumed, 7);

            let mut longer = buf.to_vec();
            longer.extend_from_slice(&[0x07, 0x07]);
            let (frame, consumed) = parse(&longer).unwrap();
            match frame {
                Frame::Stream(stream) => assert_eq!(stream.data, &[0x07, 0x07]),
                _ => panic!("Expected Stream frame"),
            }
            assert_eq!(consumed, 9);
        }

        #[test]
        fn test_declared_length_exceeds_input() {
            let buf = [0xad, 0x12, 0x34, 0x0a, 0x0b, 0x0c, 0x0d, 0x01, 0x00];
            assert_eq!(parse(&buf), Err(truncated(1, 0)));
        }
    }

    mod ack_frame_tests {
        use super::*;

        const ACK_HEADER_48: [u8; 10] = [0x42, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xca, 0xfe, 0x03];
        const TIMESTAMPS: [u8; 11] = [
            0x66, 0x0a, 0x0b, 0x0c, 0x0d, 0x67, 0x89, 0x17, 0x68, 0x84, 0x19,
        ];

        fn ack_bytes(type_byte: u8, tail: &[u8]) -> Vec<u8> {
            let mut buf = vec![type_byte];
            buf.extend_from_slice(&ACK_HEADER_48);
            buf.extend_from_slice(&TIMESTAMPS);
            buf.extend_from_slice(tail);
            buf
        }

        #[test]
        fn test_no_timestamps_no_nack() {
            let buf = [0x4f, 0x42, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xca, 0xfe, 0x00];
            let (frame, consumed) = parse(&buf).unwrap();
            assert_eq!(
                frame,
                Frame::Ack(AckFrame {
                    entropy_hash: 0x42,
                    largest_observed: 0x0605_0403_0201,
                    largest_observed_delta_time: 0xfeca,
                    timestamps: None,
                    truncated: false,
                    nack: None,
                })
            );
            assert_eq!(consumed, 11);
        }

        #[test]
        fn test_timestamps() {
            let buf = ack_bytes(0x4d, &[]);
            let (frame, consumed) = parse(&buf).unwrap();
            let ack = match frame {
                Frame::Ack(ack) => ack,
                _ => panic!("Expected Ack frame"),
            };
            let timestamps = ack.timestamps.unwrap();
            assert_eq!(
                timestamps.first,
                FirstTimestamp {
                    delta_from_largest_observed: 0x66,
                    time_since_largest_observed: 0x0d0c_0b0a,
                }
            );
            assert_eq!(
                timestamps.subsequent.as_slice(),
                &[
                    SubsequentTimestamp {
                        delta_from_largest_observed: 0x67,
                        time_since_previous: 0x1789,
                    },
                    SubsequentTimestamp {
                        delta_from_largest_observed: 0x68,
                        time_since_previous: 0x1984,
                    },
                ]
            );
            assert!(ack.nack.is_none());
            assert_eq!(consumed, buf.len());
        }

        #[test]
        fn test_missing_ranges_at_each_width() {
            let cases: [(u8, Vec<u8>, [u64; 2]); 4] = [
                (0x6c, vec![0x02, 0xaa, 0x55, 0xcc, 0x44, 0x00], [0xaa, 0xcc]),
                (
                    0x6d,
                    vec![0x02, 0xaa, 0xbb, 0x55, 0xcc, 0xdd, 0x44, 0x00],
                    [0xbbaa, 0xddcc],
                ),
                (
                    0x6e,
                    vec![
                        0x02, 0xaa, 0xbb, 0x0a, 0x0b, 0x55, 0xcc, 0xdd, 0x0c, 0x0d, 0x44, 0x00,
                    ],
                    [0x0b0a_bbaa, 0x0d0c_ddcc],
                ),
                (
                    0x6f,
                    vec![
                        0x02, 0xaa, 0xbb, 0x0a, 0x0b, 0xa0, 0xb0, 0x55, 0xcc, 0xdd, 0x0c, 0x0d,
                        0xc0, 0xd0, 0x44, 0x00,
                    ],
                    [0xb0a0_0b0a_bbaa, 0xd0c0_0d0c_ddcc],
                ),
            ];

            for (type_byte, tail, deltas) in cases {
                let buf = ack_bytes(type_byte, &tail);
                let (frame, consumed) = parse(&buf).unwrap();
                let nack = match frame {
                    Frame::Ack(ack) => ack.nack.unwrap(),
                    _ => panic!("Expected Ack frame"),
                };
                assert_eq!(
                    nack.missing_ranges.as_slice(),
                    &[
                        MissingRange {
                            sequence_number_delta: deltas[0],
                            range_length: 0x55,
                        },
                        MissingRange {
                            sequence_number_delta: deltas[1],
                            range_length: 0x44,
                        },
                    ]
                );
                assert!(nack.revived_packets.is_empty());
                assert_eq!(consumed, buf.len());
            }
        }

        #[test]
        fn test_revived_packets_are_two_bytes() {
            let buf = [
                0x64, 0x42, 0x01, 0x02, 0xca, 0xfe, 0x00, 0x02, 0xaa, 0x55, 0xcc, 0x44, 0x03,
                0xa1, 0xa2, 0xb1, 0xb2, 0xc1, 0xc2,
            ];
            let (frame, consumed) = parse(&buf).unwrap();
            let ack = match frame {
                Frame::Ack(ack) => ack,
                _ => panic!("Expected Ack frame"),
            };
            assert_eq!(ack.largest_observed, 0x0201);
            assert!(ack.timestamps.is_none());
            assert_eq!(
                ack.nack.unwrap().revived_packets.as_slice(),
                &[0xa2a1, 0xb2b1, 0xc2c1]
            );
            assert_eq!(consumed, buf.len());
        }

        #[test]
        fn test_truncated_flag() {
            let buf = [0x50, 0x00, 0x01, 0x00, 0x00, 0x00];
            let (frame, _) = parse(&buf).unwrap();
            match frame {
                Frame::Ack(ack) => assert!(ack.truncated),
                _ => panic!("Expected Ack frame"),
            }
        }

        #[test]
        fn test_truncated_nack_section() {
            let buf = ack_bytes(0x6c, &[0x02, 0xaa, 0x55, 0xcc]);
            assert_eq!(parse(&buf), Err(truncated(1, 0)));
        }
    }

    mod frame_iterator_tests {
        use super::*;

        #[test]
        fn test_walks_payload() {
            let payload = [
                0x07, // PING
                0x05, 0x01, 0x00, 0x00, 0x00, // BLOCKED
                0xa0, 0x04, 0x02, 0x00, 0xde, 0xad, // STREAM with length
                0x00, 0x00, 0x00, // PADDING
            ];
            let parser = DefaultFrameParser::new();
            let frames = parser.parse_all_frames(&payload).unwrap();
            assert_eq!(frames.len(), 4);
            assert_eq!(frames[0], Frame::Ping);
            assert_eq!(frames[1], Frame::Blocked(BlockedFrame { stream_id: 1 }));
            match &frames[2] {
                Frame::Stream(stream) => {
                    assert_eq!(stream.stream_id, 4);
                    assert_eq!(stream.data, &[0xde, 0xad]);
                }
                _ => panic!("Expected Stream frame"),
            }
            assert_eq!(frames[3], Frame::Padding(PaddingFrame { length: 2 }));
        }

        #[test]
        fn test_stops_after_error() {
            let payload = [0x07, 0x08, 0x07];
            let parser = DefaultFrameParser::new();
            let mut iter = parser.iter_frames(&payload);
            assert_eq!(iter.next(), Some(Ok(Frame::Ping)));
            assert_eq!(iter.next(), Some(Err(Error::UnknownFrameType(0x08))));
            assert_eq!(iter.next(), None);
            assert_eq!(iter.offset(), payload.len());
        }

        #[test]
        fn test_empty_payload() {
            let parser = DefaultFrameParser::new();
            assert_eq!(parser.iter_frames(&[]).count(), 0);
            assert!(parser.parse_all_frames(&[]).unwrap().is_empty());
        }
    }

    mod unknown_frame_tests {
        use super::*;

        #[test]
        fn test_unknown_type() {
            assert_eq!(parse(&[0x3f]), Err(Error::UnknownFrameType(0x3f)));
            assert_eq!(parse(&[0x08, 0x00]), Err(Error::UnknownFrameType(0x08)));
        }

        #[test]
        fn test_empty_buffer() {
            assert_eq!(parse(&[]), Err(truncated(1, 0)));
        }
    }
}
