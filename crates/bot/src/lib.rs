//! Poll-evaluate-notify loop for the space-weather bot.
//!
//! - [`AlertScheduler`] runs one cycle: fetch every feed, detect, apply
//!   cooldowns, notify.
//! - [`runner`] drives cycles from a fixed interval and manual triggers.

pub mod runner;
pub mod scheduler;

pub use runner::{run_loop, RunnerHandle};
pub use scheduler::{AlertScheduler, Clock, CycleReport, KindOutcome, SystemClock};
