//! Codec configuration.
//!
//! The frame layout is fixed by the wire format, so the only tunable is the
//! out-of-band width the connection layer assigns to STOP_WAITING deltas.
//! It usually tracks the packet number length of the enclosing packet.
//!
//! # Example
//!
//! ```toml
//! [codec]
//! least_unacked_width = 4
//! ```

use crate::frames::{DefaultFrameParser, DefaultFrameSerializer};
use crate::types::SequenceNumberWidth;
use serde::{Deserialize, Serialize};

/// Frame codec configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Byte width of STOP_WAITING least-unacked deltas (1, 2, 4 or 6).
    ///
    /// Unset means STOP_WAITING frames are rejected with
    /// `MissingWidthConfiguration` in both directions.
    pub least_unacked_width: Option<SequenceNumberWidth>,
}

impl CodecConfig {
    pub fn with_least_unacked_width(width: SequenceNumberWidth) -> Self {
        Self {
            least_unacked_width: Some(width),
        }
    }

    pub fn parser(&self) -> DefaultFrameParser {
        DefaultFrameParser::from_config(self)
    }

    pub fn serializer(&self) -> DefaultFrameSerializer {
        DefaultFrameSerializer::from_config(self)
    }
}
