//! GIF block walk: logical screen size plus a count of image descriptors.
//!
//! LZW data is skipped sub-block by sub-block and never decompressed.

use super::le_u16;
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;

/// Frames are emitted as composited RGBA.
pub(crate) const GIF_CHANNELS: usize = 4;

const HEADER_LEN: usize = 13;
const EXTENSION: u8 = 0x21;
const IMAGE_DESCRIPTOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

fn color_table_len(packed: u8) -> usize {
    3 * (1usize << ((packed & 0x07) + 1))
}

pub(super) fn probe(bytes: &[u8]) -> Result<DimensionDescriptor> {
    let malformed = |reason: &str| UnpackError::malformed(Format::Gif, reason);

    if bytes.len() < HEADER_LEN {
        return Err(malformed("logical screen descriptor truncated"));
    }
    let width = le_u16(bytes, 6).unwrap_or(0) as usize;
    let height = le_u16(bytes, 8).unwrap_or(0) as usize;
    if width == 0 || height == 0 {
        return Err(malformed("logical screen declares a zero dimension"));
    }

    let packed = bytes[10];
    let mut pos = HEADER_LEN;
    if packed & 0x80 != 0 {
        pos += color_table_len(packed);
    }

    let frames = count_frames(bytes, pos)?;
    if frames == 0 {
        return Err(malformed("no image descriptors"));
    }

    Ok(DimensionDescriptor {
        frames,
        ..DimensionDescriptor::raster(height, width, GIF_CHANNELS, 1)
    })
}

fn count_frames(bytes: &[u8], mut pos: usize) -> Result<usize> {
    let mut frames = 0;

    loop {
        let Some(&introducer) = bytes.get(pos) else {
            // Missing trailer: accept what was fully described.
            return Ok(frames);
        };

        match introducer {
            TRAILER => return Ok(frames),
            EXTENSION => {
                pos = skip_sub_blocks(bytes, pos + 2)?;
            }
            IMAGE_DESCRIPTOR => {
                let packed = *bytes.get(pos + 9).ok_or_else(|| {
                    UnpackError::malformed(Format::Gif, "image descriptor truncated")
                })?;
                pos += 10;
                if packed & 0x80 != 0 {
                    pos += color_table_len(packed);
                }
                // LZW minimum code size
                pos += 1;
                pos = skip_sub_blocks(bytes, pos)?;
                frames += 1;
            }
            other => {
                return Err(UnpackError::malformed(
                    Format::Gif,
                    format!("unexpected block introducer 0x{:02X}", other),
                ));
            }
        }
    }
}

/// Skip a data sub-block chain, returning the offset after its terminator.
fn skip_sub_blocks(bytes: &[u8], mut pos: usize) -> Result<usize> {
    loop {
        let size = *bytes
            .get(pos)
            .ok_or_else(|| UnpackError::malformed(Format::Gif, "data sub-blocks truncated"))?
            as usize;
        pos += 1;
        if size == 0 {
            return Ok(pos);
        }
        pos += size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(width: u16, height: u16) -> Vec<u8> {
        let mut out = b"GIF89a".to_vec();
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        // global color table of 2 entries
        out.extend_from_slice(&[0x80, 0, 0]);
        out.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
        out
    }

    fn frame() -> Vec<u8> {
        let mut out = vec![0x21, 0xF9, 0x04, 0x00, 0x0A, 0x00, 0x00, 0x00];
        out.extend_from_slice(&[0x2C, 0, 0, 0, 0, 1, 0, 1, 0, 0x00]);
        out.extend_from_slice(&[0x02, 0x02, 0x44, 0x01, 0x00]);
        out
    }

    #[test]
    fn test_counts_frames() {
        let mut bytes = header(4, 3);
        for _ in 0..3 {
            bytes.extend(frame());
        }
        bytes.push(TRAILER);

        let dims = probe(&bytes).unwrap();
        assert_eq!(dims.frames, 3);
        assert_eq!((dims.height, dims.width), (3, 4));
        assert_eq!(dims.channels, GIF_CHANNELS);
    }

    #[test]
    fn test_missing_trailer_is_tolerated() {
        let mut bytes = header(2, 2);
        bytes.extend(frame());
        assert_eq!(probe(&bytes).unwrap().frames, 1);
    }

    #[test]
    fn test_no_frames_is_malformed() {
        let mut bytes = header(2, 2);
        bytes.push(TRAILER);
        assert!(probe(&bytes).is_err());
    }

    #[test]
    fn test_truncated_image_data_is_malformed() {
        let mut bytes = header(2, 2);
        let mut f = frame();
        f.truncate(f.len() - 3);
        bytes.extend(f);
        assert!(probe(&bytes).is_err());
    }

    #[test]
    fn test_zero_screen_is_malformed() {
        assert!(probe(&header(0, 2)).is_err());
    }
}
