//! Pluggable compression codecs, identified by a 1-byte tag in the header

use crate::{ColfError, Result};
use serde::{Deserialize, Serialize};

const CODEC_NONE: u8 = 0;
const CODEC_SNAPPY: u8 = 1;

/// Compression codec for column payloads.
///
/// The codec id is stored in the file header so each file self-describes;
/// readers select the codec by tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compression {
    /// No compression (default), identity in both directions
    #[default]
    None,
    /// Snappy raw block format, compatible with the common implementations
    Snappy,
}

impl Compression {
    pub fn from_codec_id(id: u8) -> Option<Self> {
        match id {
            CODEC_NONE => Some(Compression::None),
            CODEC_SNAPPY => Some(Compression::Snappy),
            _ => None,
        }
    }

    pub fn codec_id(self) -> u8 {
        match self {
            Compression::None => CODEC_NONE,
            Compression::Snappy => CODEC_SNAPPY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Snappy => "snappy",
        }
    }

    /// Compress one payload as a single opaque block
    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Snappy => snap::raw::Encoder::new()
                .compress_vec(data)
                .map_err(|e| ColfError::Compression(e.to_string())),
        }
    }

    /// Decompress one payload block
    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data.to_vec()),
            Compression::Snappy => snap::raw::Decoder::new()
                .decompress_vec(data)
                .map_err(|e| ColfError::Compression(e.to_string())),
        }
    }
}
