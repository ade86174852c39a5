//! # Format Detection Module
//!
//! Recognizes container formats purely from the leading bytes of a buffer.
//! File names, extensions and MIME types are never consulted.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

// ============================================================================
// Format Types
// ============================================================================

/// Container formats understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Portable Network Graphics
    Png,
    /// JPEG/JFIF
    Jpeg,
    /// Graphics Interchange Format (possibly animated)
    Gif,
    /// RIFF WAVE audio
    Wav,
    /// No signature matched
    #[default]
    Unknown,
}

/// How a format's tensor is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Single raster: `[height, width, channels]`
    Image,
    /// Frame sequence: `[frames, height, width, channels]`
    Animation,
    /// PCM samples: `[frames, channels]`
    Audio,
}

impl Format {
    /// The decodable formats, in sniffing priority order.
    pub const SUPPORTED: [Format; 4] = [Format::Png, Format::Jpeg, Format::Gif, Format::Wav];

    /// Constant name exposed to bindings.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpeg",
            Format::Gif => "gif",
            Format::Wav => "wav",
            Format::Unknown => "unknown",
        }
    }

    /// Tensor layout family, `None` for [`Format::Unknown`].
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            Format::Png | Format::Jpeg => Some(MediaKind::Image),
            Format::Gif => Some(MediaKind::Animation),
            Format::Wav => Some(MediaKind::Audio),
            Format::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Format::Unknown)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Signatures
// ============================================================================

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const GIF87A: &[u8; 6] = b"GIF87a";
const GIF89A: &[u8; 6] = b"GIF89a";
const RIFF: &[u8; 4] = b"RIFF";
const WAVE: &[u8; 4] = b"WAVE";

/// Longest signature window inspected (`RIFF....WAVE`).
pub const SNIFF_WINDOW: usize = 12;

/// Stateless signature matcher.
pub struct FormatSniffer;

impl FormatSniffer {
    /// Detect the container format of `bytes`.
    ///
    /// Only the first [`SNIFF_WINDOW`] bytes are inspected. Signatures are
    /// tried in the order PNG, JPEG, GIF, WAV; buffers shorter than a
    /// signature never match it.
    pub fn sniff(bytes: &[u8]) -> Format {
        let prefix = &bytes[..bytes.len().min(SNIFF_WINDOW)];

        let format = if prefix.starts_with(&PNG_SIGNATURE) {
            Format::Png
        } else if prefix.starts_with(&JPEG_SOI) {
            Format::Jpeg
        } else if prefix.starts_with(GIF87A) || prefix.starts_with(GIF89A) {
            Format::Gif
        } else if prefix.len() >= SNIFF_WINDOW && &prefix[..4] == RIFF && &prefix[8..12] == WAVE {
            Format::Wav
        } else {
            Format::Unknown
        };

        trace!(len = bytes.len(), %format, "Sniffed container");
        format
    }
}
