//! PNG header walk: `IHDR` plus the ancillary chunks that change the
//! expanded channel count.

use super::be_u32;
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;

const SIGNATURE_LEN: usize = 8;
const IHDR_LEN: u32 = 13;
const MAX_CHUNK_LEN: u32 = 0x7FFF_FFFF;

pub(super) fn probe(bytes: &[u8]) -> Result<DimensionDescriptor> {
    let malformed = |reason: &str| UnpackError::malformed(Format::Png, reason);

    let ihdr_len = be_u32(bytes, SIGNATURE_LEN).ok_or_else(|| malformed("truncated before IHDR"))?;
    let ihdr_type = bytes
        .get(SIGNATURE_LEN + 4..SIGNATURE_LEN + 8)
        .ok_or_else(|| malformed("truncated before IHDR"))?;
    if ihdr_type != b"IHDR" || ihdr_len != IHDR_LEN {
        return Err(malformed("first chunk is not a 13-byte IHDR"));
    }

    let body = SIGNATURE_LEN + 8;
    let ihdr = bytes
        .get(body..body + IHDR_LEN as usize)
        .ok_or_else(|| malformed("IHDR truncated"))?;

    let width = u32::from_be_bytes([ihdr[0], ihdr[1], ihdr[2], ihdr[3]]);
    let height = u32::from_be_bytes([ihdr[4], ihdr[5], ihdr[6], ihdr[7]]);
    let bit_depth = ihdr[8];
    let color_type = ihdr[9];

    if width == 0 || height == 0 {
        return Err(malformed("IHDR declares a zero dimension"));
    }
    if ihdr[10] != 0 || ihdr[11] != 0 || ihdr[12] > 1 {
        return Err(malformed("IHDR compression, filter or interlace method is invalid"));
    }

    let base_channels = match (color_type, bit_depth) {
        (0, 1 | 2 | 4 | 8 | 16) => 1,
        (2, 8 | 16) => 3,
        (3, 1 | 2 | 4 | 8) => 3,
        (4, 8 | 16) => 2,
        (6, 8 | 16) => 4,
        _ => {
            return Err(malformed(&format!(
                "illegal color type {} with bit depth {}",
                color_type, bit_depth
            )))
        }
    };

    let has_trns = scan_to_idat(bytes, body + IHDR_LEN as usize + 4)?;

    // Expansion turns tRNS into an alpha channel for gray, RGB and palette.
    let channels = if has_trns && matches!(color_type, 0 | 2 | 3) {
        base_channels + 1
    } else {
        base_channels
    };
    let bytes_per_channel = if bit_depth == 16 { 2 } else { 1 };

    Ok(DimensionDescriptor::raster(
        height as usize,
        width as usize,
        channels,
        bytes_per_channel,
    ))
}

/// Walk chunk headers from `offset` to the first `IDAT`, reporting whether a
/// `tRNS` chunk precedes it.
fn scan_to_idat(bytes: &[u8], mut offset: usize) -> Result<bool> {
    let mut has_trns = false;

    loop {
        let length = be_u32(bytes, offset).ok_or_else(|| {
            UnpackError::malformed(Format::Png, "chunk stream ends before IDAT")
        })?;
        let kind = bytes
            .get(offset + 4..offset + 8)
            .ok_or_else(|| UnpackError::malformed(Format::Png, "chunk stream ends before IDAT"))?;

        if length > MAX_CHUNK_LEN {
            return Err(UnpackError::malformed(Format::Png, "chunk length out of range"));
        }

        match kind {
            b"IDAT" => return Ok(has_trns),
            b"IEND" => {
                return Err(UnpackError::malformed(Format::Png, "IEND before any IDAT"));
            }
            b"tRNS" => has_trns = true,
            _ => {}
        }

        // length + type + crc
        offset = offset
            .checked_add(12 + length as usize)
            .ok_or_else(|| UnpackError::malformed(Format::Png, "chunk length out of range"))?;
    }
}
