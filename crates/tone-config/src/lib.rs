//! Read-only typed accessor over the tone engine's named JSON config blobs.
//!
//! This crate owns no network or filesystem polling logic of its own — it
//! assumes the caller already has the blobs as `serde_json::Value` (however
//! they were fetched) and exposes a stable typed surface over them, plus the
//! small set of process-level [`flags::RuntimeFlags`] read from the
//! environment.

pub mod blobs;
pub mod error;
pub mod flags;
pub mod provider;

pub use blobs::*;
pub use error::ConfigError;
pub use flags::{RuntimeFlags, ScanMode};
pub use provider::{ConfigProvider, ALL_BLOBS, CRITICAL_BLOBS};
