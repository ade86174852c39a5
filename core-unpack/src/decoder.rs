//! # Decoder
//!
//! Single-input facade over sniff → probe → decode.
//!
//! ## State
//!
//! A decoder moves through [`DecoderState`] as the two-step guess API and
//! `unpack` are called on the same buffer:
//!
//! ```text
//! Fresh ──guess_format──▶ FormatKnown ──guess_dims──▶ DimsKnown ──unpack──▶ Decoded
//! ```
//!
//! `unpack` runs whichever steps are missing. Inputs are identified by length
//! and SHA-256 of their contents, so a different buffer, or the same buffer
//! rewritten in place, starts over from `Fresh`. Decoders are cheap and never
//! shared across threads by the batch path; each item gets its own.
//!
//! ## Example
//!
//! ```rust,ignore
//! use core_unpack::Decoder;
//!
//! let mut decoder = Decoder::new();
//! if decoder.guess_format(&bytes) && decoder.guess_dims(&bytes) {
//!     let dims = decoder.dims().unwrap();
//!     println!("{}x{}x{}", dims.height, dims.width, dims.channels);
//!     let tensor = decoder.unpack(&bytes)?;
//! }
//! ```

use crate::batch::{BatchDecoder, BatchItem};
use crate::codec::{decode_with, Codec, MediaCodec};
use crate::config::DecodeConfig;
use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::{Format, FormatSniffer};
use crate::probe::DimensionProber;
use crate::tensor::TensorBuffer;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

/// Progress of a decoder on its current input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Nothing known about the current input.
    #[default]
    Fresh,
    FormatKnown(Format),
    DimsKnown(Format, DimensionDescriptor),
    /// Last `unpack` succeeded with this format and shape.
    Decoded(Format, DimensionDescriptor),
}

impl DecoderState {
    pub fn format(&self) -> Format {
        match self {
            DecoderState::Fresh => Format::Unknown,
            DecoderState::FormatKnown(format)
            | DecoderState::DimsKnown(format, _)
            | DecoderState::Decoded(format, _) => *format,
        }
    }

    pub fn dims(&self) -> Option<DimensionDescriptor> {
        match self {
            DecoderState::DimsKnown(_, dims) | DecoderState::Decoded(_, dims) => Some(*dims),
            _ => None,
        }
    }
}

/// Content identity of the input the current state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InputKey {
    len: usize,
    digest: [u8; 32],
}

impl InputKey {
    fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            len: bytes.len(),
            digest: hasher.finalize().into(),
        }
    }
}

/// Single-input media decoder.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecodeConfig,
    state: DecoderState,
    input: Option<InputKey>,
}

impl Decoder {
    /// Decoder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder with a validated configuration.
    pub fn with_config(config: DecodeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: DecodeConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Format recorded for the current input ([`Format::Unknown`] if none).
    pub fn format(&self) -> Format {
        self.state.format()
    }

    /// Dimensions recorded for the current input.
    pub fn dims(&self) -> Option<DimensionDescriptor> {
        self.state.dims()
    }

    /// Forget the current input.
    pub fn reset(&mut self) {
        self.state = DecoderState::Fresh;
        self.input = None;
    }

    /// Sniff `bytes` and record the format.
    ///
    /// Always starts over from `Fresh`. Returns `false` when no signature
    /// matches.
    pub fn guess_format(&mut self, bytes: &[u8]) -> bool {
        self.sniff(bytes, InputKey::of(bytes))
    }

    fn sniff(&mut self, bytes: &[u8], key: InputKey) -> bool {
        self.reset();
        self.input = Some(key);

        let format = FormatSniffer::sniff(bytes);
        if !format.is_known() {
            debug!(len = bytes.len(), "No known signature");
            return false;
        }
        self.state = DecoderState::FormatKnown(format);
        true
    }

    /// Probe `bytes` and record the dimensions.
    ///
    /// Requires a successful [`guess_format`](Self::guess_format) on the same
    /// buffer. Returns `false` on any probing failure, including a tensor
    /// that would exceed [`DecodeConfig::max_tensor_bytes`].
    pub fn guess_dims(&mut self, bytes: &[u8]) -> bool {
        if self.input != Some(InputKey::of(bytes)) {
            warn!("guess_dims called before guess_format on this input");
            return false;
        }
        let format = match self.state {
            DecoderState::Fresh => return false,
            DecoderState::FormatKnown(format) => format,
            DecoderState::DimsKnown(_, _) | DecoderState::Decoded(_, _) => return true,
        };

        match self.probe_within_limit(bytes, format) {
            Ok(dims) => {
                self.state = DecoderState::DimsKnown(format, dims);
                true
            }
            Err(err) => {
                debug!(%format, error = %err, "Dimension probe rejected input");
                false
            }
        }
    }

    /// Decode `bytes` into a tensor, sniffing and probing first if needed.
    ///
    /// On success the recorded format and dimensions describe the returned
    /// tensor.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn unpack(&mut self, bytes: &[u8]) -> Result<TensorBuffer> {
        let format = self.ensure_format(bytes)?;
        let codec = Codec::for_format(format).ok_or(UnpackError::UnknownFormat)?;
        self.unpack_with(bytes, codec.as_media_codec())
    }

    /// Decode many buffers on a fresh worker pool; see [`BatchDecoder`].
    pub fn unpack_many<B>(&self, inputs: &[B], worker_count: usize) -> Result<Vec<BatchItem>>
    where
        B: AsRef<[u8]> + Sync,
    {
        BatchDecoder::new(self.config.clone())?.unpack_many(inputs, worker_count)
    }

    pub(crate) fn unpack_with(&mut self, bytes: &[u8], codec: &dyn MediaCodec) -> Result<TensorBuffer> {
        let format = self.ensure_format(bytes)?;
        let dims = match self.state {
            DecoderState::DimsKnown(_, dims) | DecoderState::Decoded(_, dims) => dims,
            _ => {
                let dims = self.probe_within_limit(bytes, format)?;
                self.state = DecoderState::DimsKnown(format, dims);
                dims
            }
        };

        let tensor = decode_with(codec, bytes, &dims).map_err(|err| {
            warn!(%format, error = %err, "Decode failed");
            err
        })?;

        debug!(%format, shape = ?tensor.shape(), "Decoded tensor");
        self.state = DecoderState::Decoded(format, dims);
        Ok(tensor)
    }

    fn ensure_format(&mut self, bytes: &[u8]) -> Result<Format> {
        let key = InputKey::of(bytes);
        if self.input == Some(key) && self.state != DecoderState::Fresh {
            return Ok(self.state.format());
        }
        if self.sniff(bytes, key) {
            Ok(self.state.format())
        } else {
            Err(UnpackError::UnknownFormat)
        }
    }

    fn probe_within_limit(&self, bytes: &[u8], format: Format) -> Result<DimensionDescriptor> {
        let dims = DimensionProber::probe(bytes, format)?;
        let kind = format.media_kind().ok_or(UnpackError::UnknownFormat)?;

        let required = dims.size_bytes(kind);
        if required > self.config.max_tensor_bytes {
            return Err(UnpackError::LimitExceeded {
                required,
                limit: self.config.max_tensor_bytes,
            });
        }
        Ok(dims)
    }
}
