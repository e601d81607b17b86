//! Alert rules for space-weather feeds.
//!
//! This crate provides:
//! - Detectors: pure functions turning a feed document into an optional alert
//! - `CooldownTracker`: per-kind debouncing of repeated notifications

pub mod cooldown;
pub mod detect;

pub use cooldown::{CooldownEntry, CooldownTracker};
pub use detect::{detect, ParseError};
