//! # Media Unpacking Engine
//!
//! Decodes raw container bytes (PNG, JPEG, GIF, WAV) into flat, shape-annotated
//! tensors without being told the format up front.
//!
//! ## Overview
//!
//! This crate handles:
//! - Format detection from leading signature bytes
//! - Cheap dimension probing from container headers
//! - Full payload decoding through per-format codecs
//! - Concurrent batch decoding with ordered, per-item results
//!
//! ## Pipeline
//!
//! ```text
//! bytes ──▶ FormatSniffer ──▶ DimensionProber ──▶ Codec ──▶ TensorBuffer
//!              (Format)     (DimensionDescriptor)
//! ```
//!
//! [`Decoder`] drives the pipeline for one buffer and records what it found.
//! [`BatchDecoder`] runs one `Decoder` per input on a worker pool.
//!
//! ## Tensor shapes
//!
//! | Kind      | Formats   | Shape                                 |
//! |-----------|-----------|---------------------------------------|
//! | Image     | PNG, JPEG | `[height, width, channels]`           |
//! | Animation | GIF       | `[frames, height, width, channels]`   |
//! | Audio     | WAV       | `[frames, channels]`                  |
//!
//! ## Example
//!
//! ```rust,ignore
//! use core_unpack::{BatchDecoder, DecodeConfig, Decoder};
//!
//! let tensor = Decoder::new().unpack(&bytes)?;
//! println!("{:?}", tensor.shape());
//!
//! let batch = BatchDecoder::new(DecodeConfig::default())?;
//! for item in batch.unpack_many(&buffers, 4)? {
//!     match item.result {
//!         Ok(tensor) => println!("{}: {:?}", item.format, tensor.shape()),
//!         Err(e) => eprintln!("{}: {}", item.format, e),
//!     }
//! }
//! ```

pub mod batch;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod dims;
pub mod error;
pub mod format;
pub mod probe;
pub mod tensor;

pub use batch::{BatchDecoder, BatchItem, ItemRecord};
pub use codec::{Codec, MediaCodec};
pub use config::DecodeConfig;
pub use decoder::{Decoder, DecoderState};
pub use dims::{AudioDescriptor, DimensionDescriptor};
pub use error::{ErrorKind, Result, UnpackError};
pub use format::{Format, FormatSniffer, MediaKind};
pub use probe::DimensionProber;
pub use tensor::{Samples, TensorBuffer};
