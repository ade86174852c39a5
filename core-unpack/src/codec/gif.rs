//! Animated GIF decoding through `image`.
//!
//! Every frame is composited onto the logical screen (disposal methods and
//! transparency applied) and emitted as a full-canvas RGBA image.

use super::{check_geometry, image_error, MediaCodec};
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::Format;
use crate::probe::GIF_CHANNELS;
use crate::tensor::Samples;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageDecoder, Limits};
use std::io::Cursor;
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GifCodec;

impl MediaCodec for GifCodec {
    fn format(&self) -> Format {
        Format::Gif
    }

    fn decode_samples(&self, bytes: &[u8], dims: &DimensionDescriptor) -> Result<Samples> {
        let to_error = image_error(Format::Gif);

        let mut decoder = GifDecoder::new(Cursor::new(bytes)).map_err(&to_error)?;
        decoder.set_limits(Limits::no_limits()).map_err(&to_error)?;

        let (width, height) = decoder.dimensions();
        check_geometry(Format::Gif, dims, height as usize, width as usize, GIF_CHANNELS)?;

        let frame_len = dims.height * dims.width * GIF_CHANNELS;
        let mut out = Vec::with_capacity(frame_len.saturating_mul(dims.frames));
        let mut decoded = 0;

        for frame in decoder.into_frames() {
            let frame = frame.map_err(&to_error)?;
            decoded += 1;
            if decoded > dims.frames {
                return Err(UnpackError::DimensionMismatch {
                    expected: frame_len * dims.frames,
                    actual: frame_len * decoded,
                });
            }
            trace!(frame = decoded, delay = ?frame.delay().numer_denom_ms(), "Composited GIF frame");
            out.extend_from_slice(frame.into_buffer().as_raw());
        }

        Ok(Samples::U8(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gif::{DisposalMethod, Encoder, Frame, Repeat};

    const PALETTE: [u8; 12] = [0, 0, 0, 255, 0, 0, 0, 0, 255, 0, 255, 0];

    fn frame(left: u16, top: u16, w: u16, h: u16, index: u8, dispose: DisposalMethod) -> Frame<'static> {
        Frame {
            left,
            top,
            width: w,
            height: h,
            dispose,
            transparent: Some(0),
            buffer: vec![index; (w * h) as usize].into(),
            ..Frame::default()
        }
    }

    fn encode(frames: &[Frame<'static>]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, 2, 2, &PALETTE).unwrap();
            encoder.set_repeat(Repeat::Infinite).unwrap();
            for f in frames {
                encoder.write_frame(f).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_frames_are_full_canvas_rgba() {
        let bytes = encode(&[
            frame(0, 0, 2, 2, 1, DisposalMethod::Keep),
            frame(1, 1, 1, 1, 2, DisposalMethod::Keep),
        ]);
        let dims = DimensionDescriptor {
            frames: 2,
            ..DimensionDescriptor::raster(2, 2, 4, 1)
        };
        let samples = GifCodec.decode_samples(&bytes, &dims).unwrap();
        let pixels = samples.as_u8().unwrap();
        assert_eq!(pixels.len(), 2 * 2 * 2 * 4);

        let second = &pixels[16..];
        // untouched pixel keeps the first frame's red
        assert_eq!(&second[0..4], &[255, 0, 0, 255]);
        // bottom-right pixel drawn blue by the second frame
        assert_eq!(&second[12..16], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_extra_frames_are_rejected() {
        let bytes = encode(&[
            frame(0, 0, 2, 2, 1, DisposalMethod::Keep),
            frame(0, 0, 2, 2, 2, DisposalMethod::Keep),
        ]);
        let dims = DimensionDescriptor::raster(2, 2, 4, 1);
        let err = GifCodec.decode_samples(&bytes, &dims).unwrap_err();
        assert!(matches!(err, UnpackError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_wrong_canvas_is_rejected() {
        let bytes = encode(&[frame(0, 0, 2, 2, 1, DisposalMethod::Keep)]);
        let dims = DimensionDescriptor::raster(3, 2, 4, 1);
        assert!(GifCodec.decode_samples(&bytes, &dims).is_err());
    }
}
