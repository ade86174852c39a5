//! # Tensor Buffer
//!
//! The flat, shape-annotated output of every codec.

use crate::dims::DimensionDescriptor;
use crate::error::{Result, UnpackError};
use crate::format::MediaKind;

/// Flat sample storage, typed by the decoded sample width.
///
/// 24-bit PCM is widened into `I32` with sign extension; its descriptor still
/// reports `bytes_per_channel = 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    I32(Vec<i32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(v) => v.len(),
            Samples::U16(v) => v.len(),
            Samples::I16(v) => v.len(),
            Samples::I32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width in bytes of the in-memory element type.
    pub fn element_size(&self) -> usize {
        match self {
            Samples::U8(_) => 1,
            Samples::U16(_) | Samples::I16(_) => 2,
            Samples::I32(_) => 4,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            Samples::U8(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&[u16]> {
        match self {
            Samples::U16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<&[i16]> {
        match self {
            Samples::I16(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            Samples::I32(v) => Some(v),
            _ => None,
        }
    }
}

/// Decoded samples plus the dimensions they were validated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorBuffer {
    kind: MediaKind,
    dims: DimensionDescriptor,
    samples: Samples,
}

impl TensorBuffer {
    /// Pair samples with their dimensions.
    ///
    /// # Errors
    ///
    /// [`UnpackError::DimensionMismatch`] when the sample count differs from
    /// what `dims` requires for `kind`. Nothing is truncated or padded.
    pub fn new(kind: MediaKind, dims: DimensionDescriptor, samples: Samples) -> Result<Self> {
        let expected = dims.sample_count(kind);
        let actual = samples.len();
        if expected != actual {
            return Err(UnpackError::DimensionMismatch { expected, actual });
        }
        Ok(Self {
            kind,
            dims,
            samples,
        })
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn dims(&self) -> &DimensionDescriptor {
        &self.dims
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    pub fn into_samples(self) -> Samples {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Tensor shape (`[h, w, c]`, `[f, h, w, c]` or `[frames, c]`).
    pub fn shape(&self) -> Vec<usize> {
        self.dims.shape(self.kind)
    }

    /// Flatten samples into little-endian bytes of `bytes_per_channel` width.
    ///
    /// 24-bit audio emits the low three bytes of each widened sample.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let width = self.dims.bytes_per_channel;
        let mut out = Vec::with_capacity(self.samples.len() * width);
        match &self.samples {
            Samples::U8(v) => out.extend_from_slice(v),
            Samples::U16(v) => v.iter().for_each(|s| out.extend_from_slice(&s.to_le_bytes())),
            Samples::I16(v) => v.iter().for_each(|s| out.extend_from_slice(&s.to_le_bytes())),
            Samples::I32(v) => v
                .iter()
                .for_each(|s| out.extend_from_slice(&s.to_le_bytes()[..width.min(4)])),
        }
        out
    }
}
