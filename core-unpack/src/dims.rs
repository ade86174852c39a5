//! # Dimension Descriptor
//!
//! Shape metadata shared by every codec.
//!
//! ## Audio field overload
//!
//! For [`MediaKind::Audio`] the raster fields are reused to keep a single
//! record shape across the binding surface:
//!
//! | field               | audio meaning                |
//! |---------------------|------------------------------|
//! | `height`            | sample rate in Hz            |
//! | `width`             | frame count                  |
//! | `frames`            | frame count                  |
//! | `channels`          | channel count                |
//! | `bytes_per_channel` | bytes per sample in the file |
//!
//! [`DimensionDescriptor::audio`] reads the overloaded fields back under their
//! audio names.

use crate::format::MediaKind;
use serde::{Deserialize, Serialize};

/// Shape of a decoded tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DimensionDescriptor {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub frames: usize,
    pub bytes_per_channel: usize,
    /// Whether samples are two's-complement signed.
    #[serde(default)]
    pub is_signed: bool,
}

/// Audio reading of an overloaded [`DimensionDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDescriptor {
    pub sample_rate: usize,
    pub frame_count: usize,
    pub channels: usize,
    pub bytes_per_sample: usize,
}

impl DimensionDescriptor {
    /// Descriptor for a single raster image.
    pub fn raster(height: usize, width: usize, channels: usize, bytes_per_channel: usize) -> Self {
        Self {
            height,
            width,
            channels,
            frames: 1,
            bytes_per_channel,
            is_signed: false,
        }
    }

    /// Descriptor for PCM audio, using the overloaded field layout.
    pub fn audio_pcm(
        sample_rate: usize,
        frame_count: usize,
        channels: usize,
        bytes_per_sample: usize,
        is_signed: bool,
    ) -> Self {
        Self {
            height: sample_rate,
            width: frame_count,
            channels,
            frames: frame_count,
            bytes_per_channel: bytes_per_sample,
            is_signed,
        }
    }

    /// Audio view of the overloaded fields.
    pub fn audio(&self) -> AudioDescriptor {
        AudioDescriptor {
            sample_rate: self.height,
            frame_count: self.frames,
            channels: self.channels,
            bytes_per_sample: self.bytes_per_channel,
        }
    }

    /// Whether every field is strictly positive.
    pub fn is_populated(&self) -> bool {
        self.height > 0
            && self.width > 0
            && self.channels > 0
            && self.frames > 0
            && self.bytes_per_channel > 0
    }

    /// Number of samples in a tensor of this shape.
    ///
    /// Raster and animation: `height × width × channels × frames`.
    /// Audio: `frames × channels`.
    ///
    /// Returns `None` on arithmetic overflow.
    pub fn checked_sample_count(&self, kind: MediaKind) -> Option<usize> {
        match kind {
            MediaKind::Image | MediaKind::Animation => self
                .height
                .checked_mul(self.width)?
                .checked_mul(self.channels)?
                .checked_mul(self.frames),
            MediaKind::Audio => self.frames.checked_mul(self.channels),
        }
    }

    /// Number of samples in a tensor of this shape, saturating on overflow.
    pub fn sample_count(&self, kind: MediaKind) -> usize {
        self.checked_sample_count(kind).unwrap_or(usize::MAX)
    }

    /// Size in bytes of the tensor at the declared sample width.
    pub fn size_bytes(&self, kind: MediaKind) -> usize {
        self.sample_count(kind).saturating_mul(self.bytes_per_channel)
    }

    /// Tensor shape for `kind`.
    pub fn shape(&self, kind: MediaKind) -> Vec<usize> {
        match kind {
            MediaKind::Image => vec![self.height, self.width, self.channels],
            MediaKind::Animation => vec![self.frames, self.height, self.width, self.channels],
            MediaKind::Audio => vec![self.frames, self.channels],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_counts() {
        let dims = DimensionDescriptor::raster(10, 10, 3, 1);
        assert_eq!(dims.frames, 1);
        assert_eq!(dims.sample_count(MediaKind::Image), 300);
        assert_eq!(dims.size_bytes(MediaKind::Image), 300);
        assert_eq!(dims.shape(MediaKind::Image), vec![10, 10, 3]);
    }

    #[test]
    fn test_animation_counts() {
        let dims = DimensionDescriptor {
            frames: 3,
            ..DimensionDescriptor::raster(4, 5, 4, 1)
        };
        assert_eq!(dims.sample_count(MediaKind::Animation), 240);
        assert_eq!(dims.shape(MediaKind::Animation), vec![3, 4, 5, 4]);
    }

    #[test]
    fn test_audio_overload() {
        let dims = DimensionDescriptor::audio_pcm(44_100, 100, 2, 2, true);
        assert_eq!(dims.height, 44_100);
        assert_eq!(dims.width, 100);
        assert_eq!(dims.sample_count(MediaKind::Audio), 200);
        assert_eq!(dims.size_bytes(MediaKind::Audio), 400);
        assert_eq!(dims.shape(MediaKind::Audio), vec![100, 2]);

        let audio = dims.audio();
        assert_eq!(audio.sample_rate, 44_100);
        assert_eq!(audio.frame_count, 100);
        assert_eq!(audio.bytes_per_sample, 2);
    }

    #[test]
    fn test_populated() {
        assert!(DimensionDescriptor::raster(1, 1, 1, 1).is_populated());
        assert!(!DimensionDescriptor::raster(0, 1, 1, 1).is_populated());
        assert!(!DimensionDescriptor::default().is_populated());
    }

    #[test]
    fn test_overflow_is_detected() {
        let dims = DimensionDescriptor::raster(usize::MAX, 2, 3, 1);
        assert_eq!(dims.checked_sample_count(MediaKind::Image), None);
        assert_eq!(dims.size_bytes(MediaKind::Image), usize::MAX);
    }
}
