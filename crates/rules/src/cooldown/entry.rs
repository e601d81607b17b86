//! Per-kind cooldown entry type.

use std::time::Duration;

use chrono::{DateTime, Utc};

use spacewx_core::AlertKind;

/// Cooldown state for a single alert kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownEntry {
    pub kind: AlertKind,
    /// Minimum interval between successive notifications.
    pub cooldown: Duration,
    /// Timestamp of the last delivered notification.
    pub last_fired: Option<DateTime<Utc>>,
}

impl CooldownEntry {
    pub fn new(kind: AlertKind, cooldown: Duration) -> Self {
        Self {
            kind,
            cooldown,
            last_fired: None,
        }
    }

    /// Time since the last notification, or `None` if never fired or if
    /// `now` lies before it.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_fired
            .and_then(|last| now.signed_duration_since(last).to_std().ok())
    }
}
