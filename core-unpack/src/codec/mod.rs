//! # Codecs
//!
//! Format-specific payload decoders behind one contract:
//! `decode(bytes, dims_hint) -> TensorBuffer`.
//!
//! ## Dispatch
//!
//! [`Codec`] is a tagged variant: the [`Format`] tag selects exactly one
//! implementation and the codecs share no state. Each implementation only
//! produces [`Samples`]; wrapping them in a [`TensorBuffer`] validates the
//! sample count against the dimension hint, so a short or long decode is
//! always a [`UnpackError::DimensionMismatch`].
//!
//! | Format | Backend             | Output                               |
//! |--------|---------------------|--------------------------------------|
//! | PNG    | `png`               | expanded 8-bit or native 16-bit      |
//! | JPEG   | `zune-jpeg`, strict | gray or RGB, 8-bit                   |
//! | GIF    | `image` (gif)       | composited RGBA frames, concatenated |
//! | WAV    | `symphonia`         | interleaved integer PCM              |

mod gif;
mod jpeg;
mod png;
mod sample_converter;
mod wav;

pub use self::gif::GifCodec;
pub use self::jpeg::JpegCodec;
pub use self::png::PngCodec;
pub use self::wav::WavCodec;
pub use sample_converter::SampleConverter;

use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;
use crate::tensor::{Samples, TensorBuffer};
use image::ImageError;

/// Payload decoder for a single container format.
#[cfg_attr(test, mockall::automock)]
pub trait MediaCodec: Send + Sync {
    /// Format this codec decodes.
    fn format(&self) -> Format;

    /// Decode the payload into flat samples laid out as `dims` describes.
    fn decode_samples(&self, bytes: &[u8], dims: &DimensionDescriptor) -> Result<Samples>;
}

/// Tagged codec selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Png(PngCodec),
    Jpeg(JpegCodec),
    Gif(GifCodec),
    Wav(WavCodec),
}

impl Codec {
    /// Codec for `format`, `None` for [`Format::Unknown`].
    pub fn for_format(format: Format) -> Option<Self> {
        match format {
            Format::Png => Some(Codec::Png(PngCodec)),
            Format::Jpeg => Some(Codec::Jpeg(JpegCodec)),
            Format::Gif => Some(Codec::Gif(GifCodec)),
            Format::Wav => Some(Codec::Wav(WavCodec)),
            Format::Unknown => None,
        }
    }

    pub(crate) fn as_media_codec(&self) -> &dyn MediaCodec {
        match self {
            Codec::Png(codec) => codec,
            Codec::Jpeg(codec) => codec,
            Codec::Gif(codec) => codec,
            Codec::Wav(codec) => codec,
        }
    }

    pub fn format(&self) -> Format {
        self.as_media_codec().format()
    }

    /// Decode `bytes` and validate the result against `dims_hint`.
    pub fn decode(&self, bytes: &[u8], dims_hint: &DimensionDescriptor) -> Result<TensorBuffer> {
        decode_with(self.as_media_codec(), bytes, dims_hint)
    }
}

/// Run `codec` and wrap its samples, rejecting any count mismatch.
pub(crate) fn decode_with(
    codec: &dyn MediaCodec,
    bytes: &[u8],
    dims_hint: &DimensionDescriptor,
) -> Result<TensorBuffer> {
    let kind = codec
        .format()
        .media_kind()
        .ok_or(UnpackError::UnknownFormat)?;
    let samples = codec.decode_samples(bytes, dims_hint)?;
    TensorBuffer::new(kind, *dims_hint, samples)
}

/// Map `image` errors onto the engine's error kinds.
pub(crate) fn image_error(format: Format) -> impl Fn(ImageError) -> UnpackError {
    move |err| match err {
        ImageError::Unsupported(e) => UnpackError::unsupported(format, e.to_string()),
        other => UnpackError::decode(format, other.to_string()),
    }
}

/// Reject a decoder whose reported geometry disagrees with the probe.
pub(crate) fn check_geometry(
    format: Format,
    dims: &DimensionDescriptor,
    height: usize,
    width: usize,
    channels: usize,
) -> Result<()> {
    if (dims.height, dims.width, dims.channels) == (height, width, channels) {
        return Ok(());
    }
    let per_frame = |h: usize, w: usize, c: usize| h.saturating_mul(w).saturating_mul(c);
    tracing::warn!(
        %format,
        probed = ?(dims.height, dims.width, dims.channels),
        decoded = ?(height, width, channels),
        "Decoder geometry disagrees with probed dimensions"
    );
    Err(UnpackError::DimensionMismatch {
        expected: per_frame(dims.height, dims.width, dims.channels),
        actual: per_frame(height, width, channels),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_format_selects_matching_codec() {
        for format in Format::SUPPORTED {
            let codec = Codec::for_format(format).unwrap();
            assert_eq!(codec.format(), format);
        }
        assert!(Codec::for_format(Format::Unknown).is_none());
    }

    #[test]
    fn test_decode_with_accepts_exact_length() {
        let mut codec = MockMediaCodec::new();
        codec.expect_format().return_const(Format::Png);
        codec
            .expect_decode_samples()
            .times(1)
            .returning(|_, _| Ok(Samples::U8(vec![7; 12])));

        let dims = DimensionDescriptor::raster(2, 2, 3, 1);
        let tensor = decode_with(&codec, b"payload", &dims).unwrap();
        assert_eq!(tensor.len(), 12);
        assert_eq!(tensor.dims(), &dims);
    }

    #[test]
    fn test_decode_with_rejects_short_output() {
        let mut codec = MockMediaCodec::new();
        codec.expect_format().return_const(Format::Gif);
        codec
            .expect_decode_samples()
            .returning(|_, _| Ok(Samples::U8(vec![0; 16])));

        let dims = DimensionDescriptor {
            frames: 2,
            ..DimensionDescriptor::raster(2, 2, 4, 1)
        };
        let err = decode_with(&codec, b"payload", &dims).unwrap_err();
        assert_eq!(
            err,
            UnpackError::DimensionMismatch {
                expected: 32,
                actual: 16
            }
        );
    }

    #[test]
    fn test_decode_with_propagates_codec_errors() {
        let mut codec = MockMediaCodec::new();
        codec.expect_format().return_const(Format::Jpeg);
        codec
            .expect_decode_samples()
            .returning(|_, _| Err(UnpackError::decode(Format::Jpeg, "bad huffman code")));

        let dims = DimensionDescriptor::raster(1, 1, 3, 1);
        let err = decode_with(&codec, b"payload", &dims).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DecodeError);
    }

    #[test]
    fn test_check_geometry() {
        let dims = DimensionDescriptor::raster(4, 5, 3, 1);
        assert!(check_geometry(Format::Jpeg, &dims, 4, 5, 3).is_ok());
        let err = check_geometry(Format::Jpeg, &dims, 4, 5, 1).unwrap_err();
        assert_eq!(
            err,
            UnpackError::DimensionMismatch {
                expected: 60,
                actual: 20
            }
        );
    }
}
