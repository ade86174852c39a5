//! # Core Runtime Module
//!
//! Provides the ambient runtime infrastructure shared by the media unpacking
//! crates:
//! - Logging and tracing infrastructure
//! - Runtime error types
//!
//! ## Overview
//!
//! The decoding engine only emits `tracing` events. Installing a subscriber is
//! the host's decision; this crate offers the standard way to do it.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
