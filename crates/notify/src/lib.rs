//! Alert delivery for the space-weather bot.
//!
//! This crate provides:
//! - `Notifier` trait for pluggable notification channels
//! - `DiscordNotifier`, posting to a guild text channel over the Discord REST API
//! - `LogNotifier`, which only logs (dry runs)

pub mod discord;
pub mod log;
pub mod traits;

pub use discord::DiscordNotifier;
pub use log::LogNotifier;
pub use traits::{Notification, Notifier, NotifyError};
