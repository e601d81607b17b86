//! One poll-evaluate-notify cycle.
//!
//! For every registered alert kind the scheduler fetches the kind's feed,
//! runs its detector, asks the cooldown tracker whether the alert may go
//! out, and hands admitted alerts to the notifier. The per-kind sequences
//! run concurrently and never affect one another: a fetch or delivery
//! failure is logged and reported for that kind only.
//!
//! Cycles never overlap. A cycle requested while another is running is
//! dropped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use spacewx_core::{AlertKind, Feed};
use spacewx_feeds::FeedSource;
use spacewx_notify::{Notification, Notifier};
use spacewx_rules::{detect, CooldownTracker};

/// Source of "now" for cooldown decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What happened to one alert kind during a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum KindOutcome {
    FetchFailed { error: String },
    NoAlert,
    Suppressed { remaining_secs: u64 },
    Notified,
    NotifyFailed { error: String },
}

/// Summary of a finished cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcomes: Vec<(AlertKind, KindOutcome)>,
}

impl CycleReport {
    pub fn outcome(&self, kind: AlertKind) -> Option<&KindOutcome> {
        self.outcomes.iter().find(|(k, _)| *k == kind).map(|(_, o)| o)
    }

    pub fn notified(&self) -> usize {
        self.count(|o| matches!(o, KindOutcome::Notified))
    }

    pub fn failures(&self) -> usize {
        self.count(|o| matches!(o, KindOutcome::FetchFailed { .. } | KindOutcome::NotifyFailed { .. }))
    }

    fn count(&self, pred: impl Fn(&KindOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Clears the running flag when the cycle ends, however it ends.
struct CycleGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

pub struct AlertScheduler {
    source: Arc<dyn FeedSource>,
    notifier: Arc<dyn Notifier>,
    cooldowns: Mutex<CooldownTracker>,
    kinds: Vec<AlertKind>,
    running: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl AlertScheduler {
    /// Scheduler over every alert kind, using the system clock.
    pub fn new(source: Arc<dyn FeedSource>, notifier: Arc<dyn Notifier>, cooldowns: CooldownTracker) -> Self {
        Self {
            source,
            notifier,
            cooldowns: Mutex::new(cooldowns),
            kinds: AlertKind::ALL.to_vec(),
            running: AtomicBool::new(false),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Restrict the cycle to a subset of kinds.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = AlertKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn kinds(&self) -> &[AlertKind] {
        &self.kinds
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Snapshot of the cooldown state.
    pub fn cooldowns(&self) -> CooldownTracker {
        self.tracker().clone()
    }

    /// Run one cycle, or return `None` if a cycle is already in progress.
    pub async fn run_cycle(&self) -> Option<CycleReport> {
        let Some(_guard) = self.begin_cycle() else {
            warn!("previous cycle still running, dropping this one");
            return None;
        };

        let started_at = self.clock.now();
        let timer = std::time::Instant::now();
        info!(kinds = self.kinds.len(), "space weather cycle started");

        let outcomes = futures::future::join_all(
            self.kinds
                .iter()
                .map(|&kind| async move { (kind, self.evaluate(kind).await) }),
        )
        .await;

        let report = CycleReport {
            started_at,
            duration_ms: timer.elapsed().as_millis() as u64,
            outcomes,
        };
        info!(
            notified = report.notified(),
            failures = report.failures(),
            duration_ms = report.duration_ms,
            "space weather cycle finished"
        );
        Some(report)
    }

    fn begin_cycle(&self) -> Option<CycleGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard { running: &self.running })
    }

    async fn evaluate(&self, kind: AlertKind) -> KindOutcome {
        let feed = Feed::for_kind(kind);
        let document = match self.source.fetch(feed).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(kind = %kind, feed = %feed, error = %e, "fetch failed, skipping detector");
                return KindOutcome::FetchFailed { error: e.to_string() };
            }
        };

        let Some(event) = detect(kind, &document) else {
            debug!(kind = %kind, "no alert");
            return KindOutcome::NoAlert;
        };

        let now = self.clock.now();
        {
            let tracker = self.tracker();
            if !tracker.should_admit(kind, now) {
                let remaining = tracker.remaining(kind, now).unwrap_or(Duration::ZERO);
                return KindOutcome::Suppressed {
                    remaining_secs: remaining.as_secs(),
                };
            }
        }

        info!(kind = %kind, observed_at = ?event.observed_at, "alert admitted, notifying");
        let notification = Notification::new(kind.id(), event.message);
        match self.notifier.send(&notification).await {
            Ok(()) => {
                self.tracker().record_fired(kind, now);
                KindOutcome::Notified
            }
            Err(e) => {
                warn!(
                    kind = %kind,
                    channel = self.notifier.channel_name(),
                    error = %e,
                    "notification failed, cooldown not started"
                );
                KindOutcome::NotifyFailed { error: e.to_string() }
            }
        }
    }

    fn tracker(&self) -> MutexGuard<'_, CooldownTracker> {
        self.cooldowns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
