//! JPEG marker walks: up to the first start-of-frame segment for probing,
//! and across every scan to the closing EOI for decoding.

use super::be_u16;
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;

const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const DHT: u8 = 0xC4;
const JPG: u8 = 0xC8;
const DAC: u8 = 0xCC;

fn is_sof(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, DHT | JPG | DAC)
}

fn is_standalone(marker: u8) -> bool {
    marker == 0x01 || (0xD0..=0xD7).contains(&marker)
}

/// Huffman-coded sequential frames (baseline and extended).
fn is_sequential(marker: u8) -> bool {
    matches!(marker, 0xC0 | 0xC1)
}

/// Where the entropy-coded data of a complete stream ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanLayout {
    pub sequential: bool,
    /// Offset of the `0xFF` run that introduces EOI.
    pub eoi: usize,
}

/// Walk every segment and scan until EOI.
///
/// Fails with [`UnpackError::Decode`] when the stream stops before EOI,
/// which is how a truncated file presents.
pub(crate) fn scan_layout(bytes: &[u8]) -> Result<ScanLayout> {
    let corrupt = |reason: &str| UnpackError::decode(Format::Jpeg, reason);

    if bytes.get(..2) != Some(&[0xFF, 0xD8][..]) {
        return Err(corrupt("missing SOI marker"));
    }

    let mut sequential = None;
    let mut scans = 0usize;
    let mut pos = 2;
    loop {
        let start = pos;
        if bytes.get(pos) != Some(&0xFF) {
            return Err(corrupt("expected marker prefix"));
        }
        while bytes.get(pos) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *bytes
            .get(pos)
            .ok_or_else(|| corrupt("stream ends without EOI"))?;
        pos += 1;

        if is_standalone(marker) {
            continue;
        }
        if marker == EOI {
            return match sequential {
                Some(sequential) if scans > 0 => Ok(ScanLayout {
                    sequential,
                    eoi: start,
                }),
                _ => Err(corrupt("EOI before any scan")),
            };
        }

        let length = be_u16(bytes, pos)
            .ok_or_else(|| corrupt("truncated segment length"))? as usize;
        if length < 2 || pos + length > bytes.len() {
            return Err(corrupt("segment runs past end of stream"));
        }
        if is_sof(marker) {
            sequential = Some(is_sequential(marker));
        }
        pos += length;

        if marker == SOS {
            if sequential.is_none() {
                return Err(corrupt("scan before frame header"));
            }
            scans += 1;
            pos = entropy_end(bytes, pos)
                .ok_or_else(|| corrupt("entropy-coded data ends without EOI"))?;
        }
    }
}

/// Offset of the first real marker after entropy-coded data at `pos`.
///
/// Stuffed `0xFF 0x00` pairs and RST markers belong to the scan.
fn entropy_end(bytes: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let at = pos + bytes.get(pos..)?.iter().position(|&b| b == 0xFF)?;
        let mut next = at + 1;
        while bytes.get(next) == Some(&0xFF) {
            next += 1;
        }
        match *bytes.get(next)? {
            0x00 | 0xD0..=0xD7 => pos = next + 1,
            _ => return Some(at),
        }
    }
}

pub(super) fn probe(bytes: &[u8]) -> Result<DimensionDescriptor> {
    let malformed = |reason: &str| UnpackError::malformed(Format::Jpeg, reason);

    if bytes.get(..2) != Some(&[0xFF, 0xD8][..]) {
        return Err(malformed("missing SOI marker"));
    }

    let mut pos = 2;
    loop {
        if bytes.get(pos) != Some(&0xFF) {
            return Err(malformed("expected marker prefix"));
        }
        while bytes.get(pos) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *bytes
            .get(pos)
            .ok_or_else(|| malformed("truncated before frame header"))?;
        pos += 1;

        if is_standalone(marker) {
            continue;
        }
        match marker {
            EOI => return Err(malformed("EOI before frame header")),
            SOS => return Err(malformed("scan before frame header")),
            _ => {}
        }

        let length = be_u16(bytes, pos)
            .ok_or_else(|| malformed("truncated segment length"))? as usize;
        if length < 2 || pos + length > bytes.len() {
            return Err(malformed("segment length out of range"));
        }

        if is_sof(marker) {
            return parse_frame_header(&bytes[pos..pos + length]);
        }
        pos += length;
    }
}

/// Parse an SOF segment (including its length field).
fn parse_frame_header(segment: &[u8]) -> Result<DimensionDescriptor> {
    if segment.len() < 8 {
        return Err(UnpackError::malformed(Format::Jpeg, "frame header too short"));
    }
    let precision = segment[2];
    let height = u16::from_be_bytes([segment[3], segment[4]]) as usize;
    let width = u16::from_be_bytes([segment[5], segment[6]]) as usize;
    let components = segment[7] as usize;

    if precision != 8 {
        return Err(UnpackError::unsupported(
            Format::Jpeg,
            format!("{}-bit sample precision", precision),
        ));
    }
    if width == 0 || height == 0 {
        return Err(UnpackError::malformed(
            Format::Jpeg,
            "frame header declares a zero dimension",
        ));
    }
    if !matches!(components, 1 | 3 | 4) {
        return Err(UnpackError::malformed(
            Format::Jpeg,
            format!("{} color components", components),
        ));
    }
    if segment.len() < 8 + 3 * components {
        return Err(UnpackError::malformed(
            Format::Jpeg,
            "frame header truncated before component specs",
        ));
    }

    Ok(DimensionDescriptor::raster(height, width, components, 1))
}
