//! # Sample Converter
//!
//! Interleaves decoded PCM buffers into native-width integer samples.

use crate::error::{Result, UnpackError};
use crate::format::Format;
use crate::tensor::Samples;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::sample::Sample;

/// Appends planar decoder output to an interleaved [`Samples`] accumulator.
///
/// Symphonia hands back one plane per channel (LLLL...RRRR...). Tensors are
/// frame-major (LRLRLR...), and the sample width is preserved rather than
/// normalized:
///
/// | Decoder buffer | Accumulator | Conversion     |
/// |----------------|-------------|----------------|
/// | `U8`           | `U8`        | none           |
/// | `S16`          | `I16`       | none           |
/// | `S24`          | `I32`       | sign extension |
/// | `S32`          | `I32`       | none           |
pub struct SampleConverter;

impl SampleConverter {
    /// Empty accumulator for PCM of `bytes_per_sample` width.
    pub fn accumulator(bytes_per_sample: usize, capacity: usize) -> Result<Samples> {
        match bytes_per_sample {
            1 => Ok(Samples::U8(Vec::with_capacity(capacity))),
            2 => Ok(Samples::I16(Vec::with_capacity(capacity))),
            3 | 4 => Ok(Samples::I32(Vec::with_capacity(capacity))),
            other => Err(UnpackError::unsupported(
                Format::Wav,
                format!("{}-byte samples", other),
            )),
        }
    }

    /// Interleave `buffer` onto the end of `out`.
    ///
    /// Fails if the decoder produced a sample type the accumulator was not
    /// sized for.
    pub fn append(buffer: &AudioBufferRef<'_>, out: &mut Samples) -> Result<()> {
        match (buffer, out) {
            (AudioBufferRef::U8(buf), Samples::U8(out)) => {
                Self::interleave_into(buf, out, |s| s);
            }
            (AudioBufferRef::S16(buf), Samples::I16(out)) => {
                Self::interleave_into(buf, out, |s| s);
            }
            (AudioBufferRef::S24(buf), Samples::I32(out)) => {
                Self::interleave_into(buf, out, |s| s.inner());
            }
            (AudioBufferRef::S32(buf), Samples::I32(out)) => {
                Self::interleave_into(buf, out, |s| s);
            }
            (_, out) => {
                return Err(UnpackError::decode(
                    Format::Wav,
                    format!(
                        "decoder produced samples that do not fit {}-byte output",
                        out.element_size()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn interleave_into<S, T>(buf: &AudioBuffer<S>, out: &mut Vec<T>, convert: fn(S) -> T)
    where
        S: Sample + Copy,
    {
        let num_channels = buf.spec().channels.count();
        let num_frames = buf.frames();
        out.reserve(num_frames * num_channels);

        for frame_idx in 0..num_frames {
            for chan_idx in 0..num_channels {
                out.push(convert(buf.chan(chan_idx)[frame_idx]));
            }
        }
    }
}
