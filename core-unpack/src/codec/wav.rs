//! Integer PCM WAV decoding through Symphonia.

use super::{MediaCodec, SampleConverter};
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::{Format, MediaKind};
use crate::tensor::Samples;
use std::io::Cursor;
use symphonia::core::codecs::{
    DecoderOptions, CODEC_TYPE_PCM_S16LE, CODEC_TYPE_PCM_S24LE, CODEC_TYPE_PCM_S32LE,
    CODEC_TYPE_PCM_U8,
};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WavCodec;

fn symphonia_error(context: &'static str) -> impl Fn(SymphoniaError) -> UnpackError {
    move |err| match err {
        SymphoniaError::Unsupported(what) => UnpackError::unsupported(Format::Wav, what),
        other => UnpackError::decode(Format::Wav, format!("{}: {}", context, other)),
    }
}

impl MediaCodec for WavCodec {
    fn format(&self) -> Format {
        Format::Wav
    }

    fn decode_samples(&self, bytes: &[u8], dims: &DimensionDescriptor) -> Result<Samples> {
        let audio = dims.audio();

        // Symphonia needs an owned, 'static source.
        let source = Box::new(Cursor::new(bytes.to_vec()));
        let mss = MediaSourceStream::new(source, Default::default());
        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(symphonia_error("failed to open RIFF stream"))?;
        let mut reader = probed.format;

        let track = reader
            .default_track()
            .ok_or_else(|| UnpackError::malformed(Format::Wav, "no audio track"))?;
        let track_id = track.id;

        let codec = track.codec_params.codec;
        if ![
            CODEC_TYPE_PCM_U8,
            CODEC_TYPE_PCM_S16LE,
            CODEC_TYPE_PCM_S24LE,
            CODEC_TYPE_PCM_S32LE,
        ]
        .contains(&codec)
        {
            return Err(UnpackError::unsupported(
                Format::Wav,
                format!("codec {:?} is not integer PCM", codec),
            ));
        }

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(symphonia_error("failed to create PCM decoder"))?;

        let capacity = dims.sample_count(MediaKind::Audio);
        let mut out = SampleConverter::accumulator(audio.bytes_per_sample, capacity)?;

        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(symphonia_error("failed to read packet")(e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = decoder
                .decode(&packet)
                .map_err(symphonia_error("failed to decode packet"))?;

            let decoded_channels = decoded.spec().channels.count();
            if decoded_channels != audio.channels {
                return Err(UnpackError::decode(
                    Format::Wav,
                    format!(
                        "decoder produced {} channels, header declares {}",
                        decoded_channels, audio.channels
                    ),
                ));
            }

            trace!(frames = decoded.frames(), "Decoded PCM packet");
            SampleConverter::append(&decoded, &mut out)?;
        }

        debug!(
            samples = out.len(),
            sample_rate = audio.sample_rate,
            "Finished PCM decode"
        );
        Ok(out)
    }
}
