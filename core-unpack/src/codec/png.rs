//! PNG payload decoding through the `png` crate.
//!
//! Palette, sub-byte grayscale and `tRNS` are expanded; 16-bit samples come
//! out of the decoder big-endian and are returned as native `u16`.

use super::{check_geometry, MediaCodec};
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;
use crate::tensor::Samples;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PngCodec;

fn decoding_error(err: png::DecodingError) -> UnpackError {
    UnpackError::decode(Format::Png, err.to_string())
}

impl MediaCodec for PngCodec {
    fn format(&self) -> Format {
        Format::Png
    }

    fn decode_samples(&self, bytes: &[u8], dims: &DimensionDescriptor) -> Result<Samples> {
        // The tensor ceiling is enforced before decode; lift png's own limit.
        let mut limits = png::Limits::default();
        limits.bytes = usize::MAX;

        let mut decoder = png::Decoder::new_with_limits(Cursor::new(bytes), limits);
        decoder.set_transformations(png::Transformations::EXPAND);
        let mut reader = decoder.read_info().map_err(decoding_error)?;

        let (color, depth) = reader.output_color_type();
        let bytes_per_channel = match depth {
            png::BitDepth::Sixteen => 2,
            _ => 1,
        };
        let (width, height) = {
            let info = reader.info();
            (info.width as usize, info.height as usize)
        };
        check_geometry(Format::Png, dims, height, width, color.samples())?;
        if bytes_per_channel != dims.bytes_per_channel {
            return Err(UnpackError::decode(
                Format::Png,
                format!(
                    "decoder output is {}-byte, probe reported {}-byte",
                    bytes_per_channel, dims.bytes_per_channel
                ),
            ));
        }

        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf).map_err(decoding_error)?;
        buf.truncate(frame.buffer_size());

        if bytes_per_channel == 2 {
            let samples = buf
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            Ok(Samples::U16(samples))
        } else {
            Ok(Samples::U8(buf))
        }
    }
}
