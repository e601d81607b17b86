//! spacewx-bot: space weather alerts for Discord.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use spacewx_bot::{run_loop, AlertScheduler, CycleReport, RunnerHandle};
use spacewx_core::credential::load_token;
use spacewx_core::{AlertKind, Config};
use spacewx_feeds::FeedClient;
use spacewx_notify::{DiscordNotifier, LogNotifier, Notifier};
use spacewx_rules::CooldownTracker;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    spacewx_core::config::load_dotenv();
    let cli = Cli::parse();

    let config = match cli.profile.as_deref() {
        Some(profile) => Config::for_profile(profile),
        None => Config::from_env(),
    }
    .context("invalid configuration")?;
    config.log_summary();

    let kinds = if cli.kinds.is_empty() {
        AlertKind::ALL.to_vec()
    } else {
        cli.kinds
    };

    match cli.command.unwrap_or_default() {
        Command::Run => run(&config, kinds).await,
        Command::Once => once(&config, kinds).await,
        Command::Probe => probe(&config, kinds).await,
        Command::TestAlert => test_alert(&config).await,
    }
}

fn discord(config: &Config) -> anyhow::Result<Arc<DiscordNotifier>> {
    let token = load_token(&config.discord).context("cannot start without a Discord bot token")?;
    let notifier = DiscordNotifier::new(token, &config.discord.api_base, &config.discord.channel_name)?;
    Ok(Arc::new(notifier))
}

fn scheduler(config: &Config, notifier: Arc<dyn Notifier>, kinds: Vec<AlertKind>) -> Arc<AlertScheduler> {
    let source = Arc::new(FeedClient::new(config.feeds.clone()));
    let scheduler = AlertScheduler::new(source, notifier, CooldownTracker::from_config(&config.schedule));
    Arc::new(scheduler.with_kinds(kinds))
}

async fn run(config: &Config, kinds: Vec<AlertKind>) -> anyhow::Result<()> {
    let scheduler = scheduler(config, discord(config)?, kinds);
    let (handle, task) = run_loop(scheduler, config.schedule.poll_interval);
    listen_for_manual_trigger(handle.clone())?;

    tokio::signal::ctrl_c().await.context("failed to listen for Ctrl-C")?;
    info!("Shutdown requested");
    handle.shutdown();
    task.await?;
    info!("spacewx-bot exited cleanly");
    Ok(())
}

async fn once(config: &Config, kinds: Vec<AlertKind>) -> anyhow::Result<()> {
    let report = scheduler(config, discord(config)?, kinds)
        .run_cycle()
        .await
        .context("cycle already running")?;
    print_report(&report)
}

async fn probe(config: &Config, kinds: Vec<AlertKind>) -> anyhow::Result<()> {
    let report = scheduler(config, Arc::new(LogNotifier), kinds)
        .run_cycle()
        .await
        .context("cycle already running")?;
    print_report(&report)
}

async fn test_alert(config: &Config) -> anyhow::Result<()> {
    let notifier = discord(config)?;
    let channel = notifier.channel().await.context("could not resolve a channel")?;
    info!("Sending test message to #{} in guild '{}'...", channel.name, channel.guild);
    notifier.test().await.context("test message was not delivered")?;
    info!("Test message sent");
    Ok(())
}

fn print_report(report: &CycleReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(unix)]
fn listen_for_manual_trigger(handle: RunnerHandle) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut usr1 = signal(SignalKind::user_defined1()).context("failed to install SIGUSR1 handler")?;
    tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            if handle.trigger() {
                info!("SIGUSR1 received, manual cycle requested");
            } else {
                warn!("SIGUSR1 received but a manual cycle is already pending");
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn listen_for_manual_trigger(_handle: RunnerHandle) -> anyhow::Result<()> {
    Ok(())
}
