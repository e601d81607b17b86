//! Background polling loop.
//!
//! Ticks on a fixed interval (the first tick fires immediately) and on
//! manual triggers, spawning one cycle per tick. Ticks that arrive while a
//! cycle is still running are dropped by the scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::scheduler::AlertScheduler;

/// Controls for a running loop.
#[derive(Clone)]
pub struct RunnerHandle {
    trigger: mpsc::Sender<()>,
    shutdown: Arc<Notify>,
}

impl RunnerHandle {
    /// Request an immediate cycle. Returns `false` if one is already queued
    /// or the loop has stopped.
    pub fn trigger(&self) -> bool {
        self.trigger.try_send(()).is_ok()
    }

    /// Stop the loop. A cycle already in flight is not waited for.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Spawn the polling loop. The returned task finishes after [`RunnerHandle::shutdown`].
pub fn run_loop(scheduler: Arc<AlertScheduler>, interval: Duration) -> (RunnerHandle, JoinHandle<()>) {
    let (trigger, triggers) = mpsc::channel(1);
    let shutdown = Arc::new(Notify::new());
    let handle = RunnerHandle {
        trigger,
        shutdown: shutdown.clone(),
    };
    let task = tokio::spawn(poll_loop(scheduler, interval, triggers, shutdown));
    (handle, task)
}

async fn poll_loop(
    scheduler: Arc<AlertScheduler>,
    interval: Duration,
    mut triggers: mpsc::Receiver<()>,
    shutdown: Arc<Notify>,
) {
    info!("Space weather poller started, running every {}s", interval.as_secs());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight: Option<JoinHandle<()>> = None;

    loop {
        let reason = tokio::select! {
            _ = ticker.tick() => "interval",
            Some(()) = triggers.recv() => "manual",
            _ = shutdown.notified() => break,
        };

        if scheduler.is_running() {
            warn!(reason, "cycle still running, tick dropped");
            continue;
        }
        debug!(reason, "starting cycle");

        let scheduler = scheduler.clone();
        in_flight = Some(tokio::spawn(async move {
            scheduler.run_cycle().await;
        }));
    }

    if in_flight.is_some_and(|task| !task.is_finished()) {
        info!("Leaving in-flight cycle behind");
    }
    info!("Space weather poller stopped");
}
