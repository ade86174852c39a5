//! # Dimension Probing
//!
//! Walks container headers to derive a [`DimensionDescriptor`] without
//! touching compressed pixel or sample payloads. Probing is cheap compared to
//! a full decode, so callers can size output storage before committing to it.
//!
//! Each format has its own walker:
//!
//! | Format | Metadata read                                   |
//! |--------|-------------------------------------------------|
//! | PNG    | `IHDR`, presence of `tRNS`, first `IDAT` header |
//! | JPEG   | marker segments up to the first SOF             |
//! | GIF    | logical screen descriptor, image descriptors    |
//! | WAV    | RIFF `fmt ` and `data` chunk headers            |

mod gif;
mod jpeg;
mod png;
mod wav;

pub(crate) use self::gif::GIF_CHANNELS;
pub(crate) use self::jpeg::{scan_layout, ScanLayout};

use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;
use tracing::debug;

/// Stateless header parser.
pub struct DimensionProber;

impl DimensionProber {
    /// Derive dimensions for a buffer whose format is already known.
    ///
    /// # Errors
    ///
    /// - [`UnpackError::UnknownFormat`] for [`Format::Unknown`]
    /// - [`UnpackError::MalformedContainer`] when required metadata is missing,
    ///   truncated or inconsistent
    /// - [`UnpackError::UnsupportedVariant`] when the header declares a
    ///   sub-mode the descriptor cannot represent
    pub fn probe(bytes: &[u8], format: Format) -> Result<DimensionDescriptor> {
        let dims = match format {
            Format::Png => png::probe(bytes)?,
            Format::Jpeg => jpeg::probe(bytes)?,
            Format::Gif => gif::probe(bytes)?,
            Format::Wav => wav::probe(bytes)?,
            Format::Unknown => return Err(UnpackError::UnknownFormat),
        };

        if !dims.is_populated() {
            return Err(UnpackError::malformed(
                format,
                format!("non-positive dimension in {:?}", dims),
            ));
        }

        debug!(%format, ?dims, "Probed dimensions");
        Ok(dims)
    }
}

// ============================================================================
// Byte Helpers
// ============================================================================

pub(crate) fn be_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let b = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

pub(crate) fn be_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn le_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let b = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn le_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
