//! Command-line interface.

use clap::{Parser, Subcommand};
use spacewx_core::AlertKind;

/// Space weather alert bot: polls NOAA SWPC feeds and posts alerts to Discord.
#[derive(Parser, Debug)]
#[command(name = "spacewx-bot", version, about)]
pub struct Cli {
    /// Config profile; `PROFILE_KEY` variables win over `KEY`. Overrides SPACEWX_PROFILE.
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Only evaluate these alert kinds (repeatable): severe-storm, aurora,
    /// forecast-storm, radio-blackout. Default: all.
    #[arg(long = "kind", global = true)]
    pub kinds: Vec<AlertKind>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Poll on the configured interval until Ctrl-C (SIGUSR1 forces a cycle).
    #[default]
    Run,
    /// Run a single cycle against Discord and exit.
    Once,
    /// Fetch and evaluate every feed, logging alerts instead of posting them.
    Probe,
    /// Post a marked test alert to the resolved channel and exit.
    TestAlert,
}
