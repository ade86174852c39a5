//! Synthesized media fixtures shared by the integration tests.
//!
//! Everything is encoded in-process; no binary files are checked in.

#![allow(dead_code)]

use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use gif::{DisposalMethod, Encoder, Frame};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

/// Install a compact test subscriber once per test binary.
pub fn init_tracing() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);
    // a second call in the same binary reports AlreadyInitialized
    let _ = init_logging(config);
}

// ============================================================================
// PNG
// ============================================================================

pub fn png(width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        let mut writer = encoder.write_header().expect("png header");
        writer.write_image_data(data).expect("png data");
    }
    out
}

/// `width × height` RGB gradient.
pub fn png_rgb(width: u32, height: u32) -> Vec<u8> {
    png(width, height, png::ColorType::Rgb, png::BitDepth::Eight, &rgb_pattern(width, height))
}

pub fn rgb_pattern(width: u32, height: u32) -> Vec<u8> {
    (0..width * height * 3).map(|i| (i % 251) as u8).collect()
}

/// Replace the first IDAT payload with an empty chunk.
pub fn truncate_idat(bytes: &[u8]) -> Vec<u8> {
    let at = bytes
        .windows(4)
        .position(|w| w == b"IDAT")
        .expect("IDAT chunk")
        - 4;
    let len = u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize;
    let after = at + 8 + len + 4;

    let mut out = bytes[..at].to_vec();
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(b"IDAT");
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&bytes[after..]);
    out
}

// ============================================================================
// JPEG
// ============================================================================

pub fn jpeg(width: u32, height: u32, color: ExtendedColorType, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .encode(data, width, height, color)
        .expect("jpeg encode");
    out
}

pub fn jpeg_rgb(width: u32, height: u32) -> Vec<u8> {
    jpeg(width, height, ExtendedColorType::Rgb8, &rgb_pattern(width, height))
}

/// SOI, a four-component SOF0 and EOI: enough to probe as CMYK.
pub fn jpeg_cmyk_header(width: u16, height: u16) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xC0];
    out.extend_from_slice(&(8u16 + 3 * 4).to_be_bytes());
    out.push(8);
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&width.to_be_bytes());
    out.push(4);
    for id in 1..=4u8 {
        out.extend_from_slice(&[id, 0x11, 0]);
    }
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

// ============================================================================
// GIF
// ============================================================================

/// Palette indices: 0 black, 1 red, 2 blue, 3 green.
pub const GIF_PALETTE: [u8; 12] = [0, 0, 0, 255, 0, 0, 0, 0, 255, 0, 255, 0];

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const CLEAR: [u8; 4] = [0, 0, 0, 0];

pub struct GifFrameSpec {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub index: u8,
    pub dispose: DisposalMethod,
}

pub fn gif(width: u16, height: u16, frames: &[GifFrameSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = Encoder::new(&mut out, width, height, &GIF_PALETTE).expect("gif header");
        for spec in frames {
            let frame = Frame {
                left: spec.left,
                top: spec.top,
                width: spec.width,
                height: spec.height,
                dispose: spec.dispose,
                delay: 10,
                buffer: vec![spec.index; spec.width as usize * spec.height as usize].into(),
                ..Frame::default()
            };
            encoder.write_frame(&frame).expect("gif frame");
        }
    }
    out
}

/// 4×4 canvas:
/// 1. full red frame, kept
/// 2. 2×2 blue frame at the origin, restored to background afterwards
/// 3. 1×1 green frame in the bottom-right corner
pub fn gif_three_frames() -> Vec<u8> {
    gif(
        4,
        4,
        &[
            GifFrameSpec {
                left: 0,
                top: 0,
                width: 4,
                height: 4,
                index: 1,
                dispose: DisposalMethod::Keep,
            },
            GifFrameSpec {
                left: 0,
                top: 0,
                width: 2,
                height: 2,
                index: 2,
                dispose: DisposalMethod::Background,
            },
            GifFrameSpec {
                left: 3,
                top: 3,
                width: 1,
                height: 1,
                index: 3,
                dispose: DisposalMethod::Keep,
            },
        ],
    )
}

/// 4×4 canvas:
/// 1. full red frame, kept
/// 2. 2×2 blue frame at the origin, restored to the previous canvas
/// 3. full frame with transparent index 0 everywhere except a green
///    bottom-right pixel
pub fn gif_with_previous_disposal() -> Vec<u8> {
    let mut overlay = vec![0u8; 16];
    overlay[15] = 3;
    let frames = [
        Frame {
            width: 4,
            height: 4,
            dispose: DisposalMethod::Keep,
            buffer: vec![1; 16].into(),
            ..Frame::default()
        },
        Frame {
            width: 2,
            height: 2,
            dispose: DisposalMethod::Previous,
            buffer: vec![2; 4].into(),
            ..Frame::default()
        },
        Frame {
            width: 4,
            height: 4,
            dispose: DisposalMethod::Keep,
            transparent: Some(0),
            buffer: overlay.into(),
            ..Frame::default()
        },
    ];

    let mut out = Vec::new();
    {
        let mut encoder = Encoder::new(&mut out, 4, 4, &GIF_PALETTE).expect("gif header");
        for frame in &frames {
            encoder.write_frame(frame).expect("gif frame");
        }
    }
    out
}

/// RGBA pixel at (`x`, `y`) of `frame` in a composited animation tensor.
pub fn gif_pixel(samples: &[u8], width: usize, height: usize, frame: usize, x: usize, y: usize) -> [u8; 4] {
    let at = ((frame * height + y) * width + x) * 4;
    [samples[at], samples[at + 1], samples[at + 2], samples[at + 3]]
}

// ============================================================================
// WAV
// ============================================================================

/// Canonical 44-byte-header integer PCM WAV.
pub fn wav(channels: u16, sample_rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
    wav_tagged(1, channels, sample_rate, bits, data)
}

pub fn wav_tagged(tag: u16, channels: u16, sample_rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
    let block_align = channels * (bits / 8);
    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// Mono 8-bit ramp of `frames` samples.
pub fn wav_mono_u8(frames: usize) -> Vec<u8> {
    let data: Vec<u8> = (0..frames).map(|i| (i % 256) as u8).collect();
    wav(1, 8_000, 8, &data)
}

/// Stereo 16-bit, left ascending and right descending.
pub fn wav_stereo_i16(frames: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(frames * 4);
    for i in 0..frames as i16 {
        data.extend_from_slice(&(i * 10).to_le_bytes());
        data.extend_from_slice(&(-i * 10).to_le_bytes());
    }
    wav(2, 44_100, 16, &data)
}
