//! Fetching of NOAA SWPC space-weather feeds.
//!
//! This crate provides:
//! - `FeedSource` trait so the scheduler can run against canned documents
//! - `FeedClient`, the reqwest-backed implementation with a per-request
//!   timeout and an identifying `User-Agent`

pub mod client;
pub mod traits;

pub use client::FeedClient;
pub use traits::{FeedSource, FetchError};
