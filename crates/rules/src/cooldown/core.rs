//! Cooldown tracker core implementation.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use spacewx_core::config::ScheduleConfig;
use spacewx_core::AlertKind;

use super::entry::CooldownEntry;

/// Tracks the last-fired time of every alert kind.
///
/// Use [`should_admit`](CooldownTracker::should_admit) before sending and
/// [`record_fired`](CooldownTracker::record_fired) after a send succeeds.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    entries: HashMap<AlertKind, CooldownEntry>,
}

impl CooldownTracker {
    /// Tracker with the default cooldown for every kind.
    pub fn new() -> Self {
        Self::from_config(&ScheduleConfig::default())
    }

    pub fn from_config(schedule: &ScheduleConfig) -> Self {
        Self::with_cooldowns(AlertKind::ALL.iter().map(|&kind| (kind, schedule.cooldown(kind))))
    }

    pub fn with_cooldowns(cooldowns: impl IntoIterator<Item = (AlertKind, Duration)>) -> Self {
        let entries = cooldowns
            .into_iter()
            .map(|(kind, cooldown)| (kind, CooldownEntry::new(kind, cooldown)))
            .collect();
        Self { entries }
    }

    /// Whether a notification of `kind` may be sent at `now`.
    ///
    /// True when the kind has never fired or strictly more than its cooldown
    /// has passed. A last-fired time in the future (clock went backwards)
    /// keeps the kind suppressed until the clock catches up.
    pub fn should_admit(&self, kind: AlertKind, now: DateTime<Utc>) -> bool {
        let Some(entry) = self.entries.get(&kind) else {
            return true;
        };
        if entry.last_fired.is_none() {
            return true;
        }
        match entry.elapsed(now) {
            Some(elapsed) if elapsed > entry.cooldown => true,
            elapsed => {
                debug!(
                    kind = %kind,
                    "alert still in cooldown ({:.0}s remaining)",
                    entry.cooldown.saturating_sub(elapsed.unwrap_or_default()).as_secs_f64(),
                );
                false
            }
        }
    }

    /// Record a delivered notification of `kind` at `at`, replacing any
    /// earlier record. Unknown kinds are tracked with no cooldown.
    pub fn record_fired(&mut self, kind: AlertKind, at: DateTime<Utc>) {
        self.entries
            .entry(kind)
            .or_insert_with(|| CooldownEntry::new(kind, Duration::ZERO))
            .last_fired = Some(at);
    }

    pub fn last_fired(&self, kind: AlertKind) -> Option<DateTime<Utc>> {
        self.entries.get(&kind).and_then(|e| e.last_fired)
    }

    pub fn cooldown(&self, kind: AlertKind) -> Option<Duration> {
        self.entries.get(&kind).map(|e| e.cooldown)
    }

    /// Time left before `kind` is admitted again; `None` when it already is.
    pub fn remaining(&self, kind: AlertKind, now: DateTime<Utc>) -> Option<Duration> {
        if self.should_admit(kind, now) {
            return None;
        }
        let entry = self.entries.get(&kind)?;
        let left = match entry.elapsed(now) {
            Some(elapsed) => entry.cooldown.saturating_sub(elapsed),
            None => {
                let ahead = entry
                    .last_fired
                    .and_then(|last| last.signed_duration_since(now).to_std().ok())
                    .unwrap_or_default();
                entry.cooldown + ahead
            }
        };
        Some(left)
    }

    pub fn get(&self, kind: AlertKind) -> Option<&CooldownEntry> {
        self.entries.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}
