//! # Unpack Error Types
//!
//! Error kinds produced while sniffing, probing and decoding media buffers.
//!
//! Errors are local to the input that produced them: a batch reports them per
//! item and never aborts other items because of them.

use crate::format::Format;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while unpacking a media buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnpackError {
    // ========================================================================
    // Detection Errors
    // ========================================================================
    /// No known container signature matched the buffer prefix.
    #[error("Unknown container format")]
    UnknownFormat,

    // ========================================================================
    // Probing Errors
    // ========================================================================
    /// Structurally required metadata is missing, truncated or inconsistent.
    #[error("Malformed {format} container: {reason}")]
    MalformedContainer { format: Format, reason: String },

    /// The format is recognized but the sub-mode is not decodable
    /// (CMYK JPEG, non-PCM WAV, ...).
    #[error("Unsupported {format} variant: {reason}")]
    UnsupportedVariant { format: Format, reason: String },

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// Entropy-coded data or the stream itself is corrupt.
    #[error("Failed to decode {format}: {reason}")]
    Decode { format: Format, reason: String },

    /// The decoded sample count disagrees with the probed dimensions.
    #[error("Decoded {actual} samples, dimensions require {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The tensor described by the probed dimensions exceeds the configured
    /// memory ceiling.
    #[error("Tensor needs {required} bytes, limit is {limit}")]
    LimitExceeded { required: usize, limit: usize },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration or batch parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Plain classification of [`UnpackError`], for bindings that map errors onto
/// host exception types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownFormat,
    MalformedContainer,
    UnsupportedVariant,
    DecodeError,
    DimensionMismatch,
    LimitExceeded,
    InvalidConfig,
}

impl UnpackError {
    pub(crate) fn malformed(format: Format, reason: impl Into<String>) -> Self {
        UnpackError::MalformedContainer {
            format,
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(format: Format, reason: impl Into<String>) -> Self {
        UnpackError::UnsupportedVariant {
            format,
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(format: Format, reason: impl Into<String>) -> Self {
        UnpackError::Decode {
            format,
            reason: reason.into(),
        }
    }

    /// Error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnpackError::UnknownFormat => ErrorKind::UnknownFormat,
            UnpackError::MalformedContainer { .. } => ErrorKind::MalformedContainer,
            UnpackError::UnsupportedVariant { .. } => ErrorKind::UnsupportedVariant,
            UnpackError::Decode { .. } => ErrorKind::DecodeError,
            UnpackError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            UnpackError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            UnpackError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Returns `true` if this error is raised before any payload is decoded.
    ///
    /// These are the failures the two-step guess API reports as `false`.
    pub fn is_probe_error(&self) -> bool {
        matches!(
            self,
            UnpackError::UnknownFormat
                | UnpackError::MalformedContainer { .. }
                | UnpackError::UnsupportedVariant { .. }
                | UnpackError::LimitExceeded { .. }
        )
    }

    /// Returns `true` if this error is related to container/variant support.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            UnpackError::UnknownFormat | UnpackError::UnsupportedVariant { .. }
        )
    }
}

/// Result type for unpack operations.
pub type Result<T> = std::result::Result<T, UnpackError>;
