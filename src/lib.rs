//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map to the individual workspace
//! crates (`core-unpack`, `core-runtime`). Host bindings can depend on
//! `media-unpack-workspace` and enable the documented features without wiring
//! each crate individually.

#[cfg(feature = "unpack")]
pub use core_unpack as unpack;

#[cfg(feature = "runtime")]
pub use core_runtime as runtime;
