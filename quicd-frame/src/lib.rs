//! quicd-frame: Frame Codec for gQUIC-style Packet Payloads
//!
//! Decodes decrypted packet payloads into typed frames and encodes typed
//! frames back into bytes. Sits between the packet encryption layer, which
//! hands over plaintext, and the connection layer, which consumes frames and
//! supplies the out-of-band STOP_WAITING width.
//!
//! # Architecture
//!
//! - **Zero-copy parsing**: stream payloads and reason phrases borrow from
//!   the input buffer
//! - **Stateless codec**: parser and serializer are `Copy` values; every
//!   decode returns a fresh frame
//! - **Canonical encoding**: width selectors are recomputed from values on
//!   every encode
//! - **Little-endian, variable-width fields**: one set of width tables in
//!   [`width`]
//!
//! # Module Organization
//!
//! - `frames`: frame types, type byte dispatch, parser, serializer
//! - `width`: width tables and bounds-checked field cursors
//! - `types`: scalar wire types and the out-of-band width
//! - `config`: serde-backed codec configuration
//! - `error`: error taxonomy
//!
//! # Example
//!
//! ```
//! use quicd_frame::{DefaultFrameParser, Frame, FrameParser};
//!
//! let payload = [0x07, 0x05, 0x01, 0x00, 0x00, 0x00];
//! let parser = DefaultFrameParser::new();
//! let frames = parser.parse_all_frames(&payload).unwrap();
//! assert_eq!(frames[0], Frame::Ping);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod frames;
pub mod types;
pub mod width;

pub use config::CodecConfig;
pub use error::{Error, Result};
pub use frames::{
    DefaultFrameParser, DefaultFrameSerializer, Frame, FrameIterator, FrameParser,
    FrameSerializer, FrameType,
};
pub use types::{ByteOffset, ErrorCode, SequenceNumber, SequenceNumberWidth, StreamId};
