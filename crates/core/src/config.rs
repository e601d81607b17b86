use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::alert::AlertKind;
use crate::error::CoreError;
use crate::feed::Feed;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Source of raw configuration values, keyed by variable name.
///
/// The process environment in production, a map in tests.
pub trait Lookup {
    fn get(&self, key: &str) -> Option<String>;
}

struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl Lookup for std::collections::HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        std::collections::HashMap::get(self, key).cloned()
    }
}

/// Read a profiled value: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_opt(src: &dyn Lookup, profile: &str, key: &str) -> Option<String> {
    let non_empty = |k: &str| src.get(k).filter(|s| !s.trim().is_empty());
    if !profile.is_empty() {
        if let Some(v) = non_empty(&format!("{}_{}", profile, key)) {
            return Some(v);
        }
    }
    non_empty(key)
}

fn profiled_or(src: &dyn Lookup, profile: &str, key: &str, default: &str) -> String {
    profiled_opt(src, profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_u64(src: &dyn Lookup, profile: &str, key: &str, default: u64) -> Result<u64, CoreError> {
    match profiled_opt(src, profile, key) {
        Some(v) => v.trim().parse().map_err(|_| CoreError::InvalidValue {
            key: key.to_string(),
            value: v,
        }),
        None => Ok(default),
    }
}

fn profiled_duration(src: &dyn Lookup, profile: &str, key: &str, default: &str) -> Result<Duration, CoreError> {
    let raw = profiled_or(src, profile, key, default);
    parse_duration(&raw).ok_or(CoreError::InvalidDuration {
        key: key.to_string(),
        value: raw,
    })
}

/// Parse a human-readable duration string into a [`Duration`].
///
/// Supports components: `Xd` (days), `Xh` (hours), `Xm` (minutes), `Xs` (seconds).
/// Components can be combined: "2h30m", "1d12h", "90s". A bare number is seconds.
/// Returns `None` if the string is empty, unparseable, or zero.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut total_secs: u64 = 0;
    let mut num_buf = String::new();
    let mut found_unit = false;

    for ch in s.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
        } else {
            let n: u64 = num_buf.parse().ok()?;
            num_buf.clear();
            let unit = match ch {
                'd' => 86_400,
                'h' => 3_600,
                'm' => 60,
                's' => 1,
                _ => return None,
            };
            total_secs = total_secs.checked_add(n.checked_mul(unit)?)?;
            found_unit = true;
        }
    }

    if !num_buf.is_empty() {
        if found_unit {
            // "30m15" is ambiguous.
            return None;
        }
        total_secs = num_buf.parse().ok()?;
    }

    if total_secs == 0 {
        return None;
    }

    Some(Duration::from_secs(total_secs))
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub discord: DiscordConfig,
    pub feeds: FeedConfig,
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SPACEWX_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Result<Self, CoreError> {
        let profile = ProcessEnv.get("SPACEWX_PROFILE").unwrap_or_default();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Result<Self, CoreError> {
        Self::from_lookup(&ProcessEnv, profile)
    }

    /// Build config from an arbitrary value source.
    pub fn from_lookup(src: &dyn Lookup, profile: &str) -> Result<Self, CoreError> {
        let p = profile.trim().to_uppercase();
        let p = p.as_str();
        Ok(Self {
            profile: p.to_string(),
            discord: DiscordConfig::from_profiled(src, p),
            feeds: FeedConfig::from_profiled(src, p)?,
            schedule: ScheduleConfig::from_profiled(src, p)?,
        })
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  discord:   api={}, channel={}, token_file={}, token_env={}",
            self.discord.api_base,
            self.discord.channel_name,
            self.discord.token_file.display(),
            self.discord.token.is_some()
        );
        tracing::info!(
            "  feeds:     timeout={}s, user_agent={}",
            self.feeds.timeout.as_secs(),
            self.feeds.user_agent
        );
        for feed in Feed::ALL {
            tracing::info!("    {:<12} {}", feed.name(), self.feeds.url(feed));
        }
        tracing::info!("  schedule:  interval={}s", self.schedule.poll_interval.as_secs());
        for (kind, cooldown) in &self.schedule.cooldowns {
            tracing::info!("    {:<15} cooldown={}s", kind.id(), cooldown.as_secs());
        }
    }
}

// ── Discord ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Token given directly through the environment; wins over `token_file`.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub token_file: PathBuf,
    pub api_base: String,
    /// Preferred channel name inside each guild.
    pub channel_name: String,
}

impl DiscordConfig {
    fn from_profiled(src: &dyn Lookup, p: &str) -> Self {
        Self {
            token: profiled_opt(src, p, "DISCORD_TOKEN"),
            token_file: PathBuf::from(profiled_or(src, p, "TOKEN_FILE", "token.txt")),
            api_base: profiled_or(src, p, "DISCORD_API_BASE", "https://discord.com/api/v10"),
            channel_name: profiled_or(src, p, "CHANNEL_NAME", "general"),
        }
    }
}

// ── Feeds ─────────────────────────────────────────────────────

pub const DEFAULT_KP_INDEX_URL: &str = "https://services.swpc.noaa.gov/products/noaa-planetary-k-index.json";
pub const DEFAULT_KP_FORECAST_URL: &str =
    "https://services.swpc.noaa.gov/products/noaa-planetary-k-index-forecast.json";
pub const DEFAULT_AURORA_URL: &str = "https://services.swpc.noaa.gov/json/ovation_aurora_latest.json";
pub const DEFAULT_XRAY_URL: &str = "https://services.swpc.noaa.gov/json/goes/primary/xrays-6-hour.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub kp_index_url: String,
    pub kp_forecast_url: String,
    pub aurora_url: String,
    pub xray_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl FeedConfig {
    fn from_profiled(src: &dyn Lookup, p: &str) -> Result<Self, CoreError> {
        let default_agent = format!("spacewx-bot/{} (space weather alerts)", env!("CARGO_PKG_VERSION"));
        Ok(Self {
            kp_index_url: profiled_or(src, p, "KP_INDEX_URL", DEFAULT_KP_INDEX_URL),
            kp_forecast_url: profiled_or(src, p, "KP_FORECAST_URL", DEFAULT_KP_FORECAST_URL),
            aurora_url: profiled_or(src, p, "AURORA_URL", DEFAULT_AURORA_URL),
            xray_url: profiled_or(src, p, "XRAY_URL", DEFAULT_XRAY_URL),
            timeout: Duration::from_secs(profiled_u64(src, p, "FEED_TIMEOUT_SECS", 10)?),
            user_agent: profiled_or(src, p, "FEED_USER_AGENT", &default_agent),
        })
    }

    pub fn url(&self, feed: Feed) -> &str {
        match feed {
            Feed::KpIndex => &self.kp_index_url,
            Feed::KpForecast => &self.kp_forecast_url,
            Feed::AuroraGrid => &self.aurora_url,
            Feed::XrayFlux => &self.xray_url,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            kp_index_url: DEFAULT_KP_INDEX_URL.to_string(),
            kp_forecast_url: DEFAULT_KP_FORECAST_URL.to_string(),
            aurora_url: DEFAULT_AURORA_URL.to_string(),
            xray_url: DEFAULT_XRAY_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: format!("spacewx-bot/{} (space weather alerts)", env!("CARGO_PKG_VERSION")),
        }
    }
}

// ── Schedule ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub poll_interval: Duration,
    pub cooldowns: BTreeMap<AlertKind, Duration>,
}

/// Env key and default for each kind's cooldown.
fn cooldown_key(kind: AlertKind) -> (&'static str, &'static str) {
    match kind {
        AlertKind::SevereGeomagneticStorm => ("SEVERE_STORM_COOLDOWN", "6h"),
        AlertKind::AuroraVisibility => ("AURORA_COOLDOWN", "6h"),
        AlertKind::ForecastStorm => ("FORECAST_COOLDOWN", "12h"),
        AlertKind::RadioBlackout => ("RADIO_BLACKOUT_COOLDOWN", "6h"),
    }
}

impl ScheduleConfig {
    fn from_profiled(src: &dyn Lookup, p: &str) -> Result<Self, CoreError> {
        let mut cooldowns = BTreeMap::new();
        for kind in AlertKind::ALL {
            let (key, default) = cooldown_key(kind);
            cooldowns.insert(kind, profiled_duration(src, p, key, default)?);
        }
        Ok(Self {
            poll_interval: profiled_duration(src, p, "POLL_INTERVAL", "15m")?,
            cooldowns,
        })
    }

    pub fn cooldown(&self, kind: AlertKind) -> Duration {
        self.cooldowns
            .get(&kind)
            .copied()
            .unwrap_or_else(|| parse_duration(cooldown_key(kind).1).unwrap_or(Duration::ZERO))
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let cooldowns = AlertKind::ALL
            .into_iter()
            .map(|k| (k, parse_duration(cooldown_key(k).1).unwrap_or(Duration::ZERO)))
            .collect();
        Self {
            poll_interval: Duration::from_secs(15 * 60),
            cooldowns,
        }
    }
}
