//! C9 ToneStream: per-field incremental controller (spec §4.9).

pub mod controller;

pub use controller::{LockTrigger, ToneStreamController};
