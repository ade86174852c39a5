//! RIFF/WAVE chunk walk for the `fmt ` and `data` headers.

use super::{le_u16, le_u32};
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;

const RIFF_HEADER_LEN: usize = 12;
const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Decoded `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WaveFormat {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

pub(super) fn probe(bytes: &[u8]) -> Result<DimensionDescriptor> {
    let (fmt, data_len) = walk_chunks(bytes)?;

    if fmt.format_tag != WAVE_FORMAT_PCM {
        return Err(UnpackError::unsupported(
            Format::Wav,
            format!("encoding tag 0x{:04X} is not integer PCM", fmt.format_tag),
        ));
    }
    if !matches!(fmt.bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(UnpackError::unsupported(
            Format::Wav,
            format!("{} bits per sample", fmt.bits_per_sample),
        ));
    }
    if fmt.channels == 0 || fmt.sample_rate == 0 {
        return Err(UnpackError::malformed(
            Format::Wav,
            "fmt chunk declares zero channels or sample rate",
        ));
    }

    let bytes_per_sample = (fmt.bits_per_sample / 8) as usize;
    let channels = fmt.channels as usize;
    if fmt.block_align as usize != channels * bytes_per_sample {
        return Err(UnpackError::malformed(
            Format::Wav,
            format!(
                "block align {} disagrees with {} channels of {} bytes",
                fmt.block_align, channels, bytes_per_sample
            ),
        ));
    }

    let frames = data_len / (channels * bytes_per_sample);
    if frames == 0 {
        return Err(UnpackError::malformed(Format::Wav, "data chunk holds no frames"));
    }

    Ok(DimensionDescriptor::audio_pcm(
        fmt.sample_rate as usize,
        frames,
        channels,
        bytes_per_sample,
        fmt.bits_per_sample > 8,
    ))
}

/// Walk RIFF chunks until `data`, returning the format and data length.
fn walk_chunks(bytes: &[u8]) -> Result<(WaveFormat, usize)> {
    let malformed = |reason: &str| UnpackError::malformed(Format::Wav, reason);

    let mut fmt = None;
    let mut pos = RIFF_HEADER_LEN;

    loop {
        let id = bytes
            .get(pos..pos + 4)
            .ok_or_else(|| malformed("chunk stream ends before data chunk"))?;
        let size = le_u32(bytes, pos + 4)
            .ok_or_else(|| malformed("chunk header truncated"))? as usize;
        let body = pos + 8;

        match id {
            b"fmt " => fmt = Some(parse_fmt(bytes, body, size)?),
            b"data" => {
                let fmt = fmt.ok_or_else(|| malformed("data chunk precedes fmt chunk"))?;
                if body.checked_add(size).map_or(true, |end| end > bytes.len()) {
                    return Err(malformed("data chunk truncated"));
                }
                return Ok((fmt, size));
            }
            _ => {}
        }

        // chunks are word aligned
        pos = body
            .checked_add(size)
            .and_then(|end| end.checked_add(size & 1))
            .ok_or_else(|| malformed("chunk size out of range"))?;
    }
}

fn parse_fmt(bytes: &[u8], body: usize, size: usize) -> Result<WaveFormat> {
    let malformed = |reason: &str| UnpackError::malformed(Format::Wav, reason);

    if size < 16 || body + size > bytes.len() {
        return Err(malformed("fmt chunk truncated"));
    }

    let field = |offset: usize| le_u16(bytes, body + offset).unwrap_or(0);
    let mut format_tag = field(0);

    // WAVE_FORMAT_EXTENSIBLE carries the real tag in the sub-format GUID.
    if format_tag == WAVE_FORMAT_EXTENSIBLE {
        if size < 40 {
            return Err(malformed("extensible fmt chunk truncated"));
        }
        format_tag = field(24);
    }

    Ok(WaveFormat {
        format_tag,
        channels: field(2),
        sample_rate: le_u32(bytes, body + 4).unwrap_or(0),
        block_align: field(12),
        bits_per_sample: field(14),
    })
}
