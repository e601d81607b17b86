//! Per-kind alert cooldowns.
//!
//! The [`CooldownTracker`] remembers when each alert kind last produced a
//! delivered notification and decides whether a newly detected alert of the
//! same kind may be sent. Kinds never affect each other.
//!
//! Only successful deliveries are recorded: a failed send leaves the kind
//! eligible on the next cycle.

mod core;
mod entry;


pub use self::core::CooldownTracker;
pub use self::entry::CooldownEntry;
