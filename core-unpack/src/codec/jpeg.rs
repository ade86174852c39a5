//! Baseline and progressive JPEG decoding through `zune-jpeg`.
//!
//! The decoder runs in strict mode, and the stream must reach EOI after its
//! last scan. zune-jpeg zero-fills once entropy-coded data runs out, so a
//! stream cut short and closed with a fresh EOI would still decode. For
//! sequential frames a run of stuffed `0xFF` bytes is spliced in front of
//! EOI: a complete scan never reads it, a short one reads all-ones bits,
//! which no Huffman table may assign.

use super::{check_geometry, MediaCodec};
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;
use crate::probe::{scan_layout, ScanLayout};
use crate::tensor::Samples;
use zune_jpeg::errors::DecodeErrors;
use zune_jpeg::zune_core::bytestream::ZCursor;
use zune_jpeg::zune_core::colorspace::ColorSpace;
use zune_jpeg::zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Stuffed `0xFF` bytes: 128 one-bits of entropy data.
const TRIPWIRE: [u8; 32] = [
    0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF,
    0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00,
    0xFF, 0x00,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JpegCodec;

impl MediaCodec for JpegCodec {
    fn format(&self) -> Format {
        Format::Jpeg
    }

    fn decode_samples(&self, bytes: &[u8], dims: &DimensionDescriptor) -> Result<Samples> {
        if dims.channels == 4 {
            return Err(UnpackError::unsupported(
                Format::Jpeg,
                "four-component (CMYK/YCCK) color",
            ));
        }

        let layout = scan_layout(bytes)?;
        let armed;
        let input = if layout.sequential {
            armed = with_tripwire(bytes, &layout);
            &armed[..]
        } else {
            bytes
        };

        let options = DecoderOptions::default()
            .set_strict_mode(true)
            .set_max_width(usize::MAX)
            .set_max_height(usize::MAX);
        let mut decoder = JpegDecoder::new_with_options(ZCursor::new(input), options);
        decoder.decode_headers().map_err(zune_error)?;

        let colorspace = match decoder.input_colorspace() {
            Some(ColorSpace::Luma) => ColorSpace::Luma,
            Some(ColorSpace::YCbCr | ColorSpace::RGB) => ColorSpace::RGB,
            other => {
                return Err(UnpackError::unsupported(
                    Format::Jpeg,
                    format!("input color space {:?}", other),
                ))
            }
        };
        decoder.set_options(decoder.options().jpeg_set_out_colorspace(colorspace));

        let (width, height) = decoder
            .dimensions()
            .ok_or_else(|| UnpackError::decode(Format::Jpeg, "frame header not decoded"))?;
        check_geometry(Format::Jpeg, dims, height, width, colorspace.num_components())?;

        let len = decoder
            .output_buffer_size()
            .ok_or_else(|| UnpackError::decode(Format::Jpeg, "frame header not decoded"))?;
        let mut buf = vec![0; len];
        decoder.decode_into(&mut buf).map_err(zune_error)?;

        Ok(Samples::U8(buf))
    }
}

/// Copy of `bytes` with [`TRIPWIRE`] in front of the closing EOI.
fn with_tripwire(bytes: &[u8], layout: &ScanLayout) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + TRIPWIRE.len());
    out.extend_from_slice(&bytes[..layout.eoi]);
    out.extend_from_slice(&TRIPWIRE);
    out.extend_from_slice(&bytes[layout.eoi..]);
    out
}

fn zune_error(err: DecodeErrors) -> UnpackError {
    match err {
        DecodeErrors::Unsupported(scheme) => {
            UnpackError::unsupported(Format::Jpeg, format!("{:?}", scheme))
        }
        other => UnpackError::decode(Format::Jpeg, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::ExtendedColorType;

    fn encode(width: u32, height: u32, color: ExtendedColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, 95)
            .encode(data, width, height, color)
            .unwrap();
        out
    }

    #[test]
    fn test_decodes_rgb() {
        let data = vec![128u8; 8 * 8 * 3];
        let bytes = encode(8, 8, ExtendedColorType::Rgb8, &data);
        let dims = DimensionDescriptor::raster(8, 8, 3, 1);
        let samples = JpegCodec.decode_samples(&bytes, &dims).unwrap();
        let pixels = samples.as_u8().unwrap();
        assert_eq!(pixels.len(), 8 * 8 * 3);
        // lossy, but a flat field survives almost exactly
        assert!(pixels.iter().all(|&p| (p as i16 - 128).abs() <= 2));
    }

    #[test]
    fn test_decodes_grayscale() {
        let bytes = encode(4, 2, ExtendedColorType::L8, &[200; 8]);
        let dims = DimensionDescriptor::raster(2, 4, 1, 1);
        let samples = JpegCodec.decode_samples(&bytes, &dims).unwrap();
        assert_eq!(samples.len(), 8);
    }

    #[test]
    fn test_tripwire_sits_before_eoi() {
        let bytes = encode(8, 8, ExtendedColorType::L8, &[90; 64]);
        let layout = scan_layout(&bytes).unwrap();
        let armed = with_tripwire(&bytes, &layout);
        assert_eq!(armed.len(), bytes.len() + TRIPWIRE.len());
        assert_eq!(&armed[armed.len() - 2..], &[0xFF, 0xD9]);
        assert_eq!(&armed[..layout.eoi], &bytes[..layout.eoi]);
    }

    #[test]
    fn test_scan_cut_short_and_reclosed_fails() {
        let data: Vec<u8> = (0..32 * 32 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let bytes = encode(32, 32, ExtendedColorType::Rgb8, &data);
        let eoi = scan_layout(&bytes).unwrap().eoi;
        let sos = bytes.windows(2).rposition(|w| w == [0xFF, 0xDA]).unwrap();

        let mut cut = bytes[..sos + (eoi - sos) / 3].to_vec();
        // keep the cut off a dangling 0xFF
        while cut.last() == Some(&0xFF) {
            cut.pop();
        }
        cut.extend_from_slice(&[0xFF, 0xD9]);

        let dims = DimensionDescriptor::raster(32, 32, 3, 1);
        let err = JpegCodec.decode_samples(&cut, &dims).unwrap_err();
        assert!(matches!(err, UnpackError::Decode { format: Format::Jpeg, .. }));
    }

    #[test]
    fn test_four_components_are_unsupported() {
        let dims = DimensionDescriptor::raster(2, 2, 4, 1);
        let err = JpegCodec.decode_samples(&[0xFF, 0xD8], &dims).unwrap_err();
        assert!(matches!(err, UnpackError::UnsupportedVariant { .. }));
    }
}
