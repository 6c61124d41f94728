//! # Frame Parsing, Serialization and Types
//!
//! All ten frame kinds of the gQUIC-style payload format with zero-copy
//! parsing. Frame payloads reference the original packet buffer via
//! lifetimes.

pub mod parse;
pub mod serialize;
pub mod types;

pub use parse::{DefaultFrameParser, FrameIterator, FrameParser};
pub use serialize::{DefaultFrameSerializer, FrameSerializer};
pub use types::*;
