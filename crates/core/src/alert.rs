//! Alert kinds and the events detectors produce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of conditions the bot watches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    SevereGeomagneticStorm,
    AuroraVisibility,
    ForecastStorm,
    RadioBlackout,
}

impl AlertKind {
    /// Every kind, in the order a cycle reports them.
    pub const ALL: [AlertKind; 4] = [
        AlertKind::SevereGeomagneticStorm,
        AlertKind::AuroraVisibility,
        AlertKind::ForecastStorm,
        AlertKind::RadioBlackout,
    ];

    /// Stable identifier used in logs and configuration.
    pub fn id(self) -> &'static str {
        match self {
            AlertKind::SevereGeomagneticStorm => "severe-storm",
            AlertKind::AuroraVisibility => "aurora",
            AlertKind::ForecastStorm => "forecast-storm",
            AlertKind::RadioBlackout => "radio-blackout",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertKind::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| format!("unknown alert kind: {s}"))
    }
}

// ── Severity scales ───────────────────────────────────────────

/// Observed geomagnetic storm level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StormLevel {
    /// Kp in [7, 8).
    Strong,
    /// Kp of 8 or more.
    Severe,
}

impl StormLevel {
    pub fn label(self) -> &'static str {
        match self {
            StormLevel::Strong => "Strong",
            StormLevel::Severe => "Severe",
        }
    }
}

impl fmt::Display for StormLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// NOAA radio-blackout scale derived from long-wavelength X-ray flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RadioScale {
    R1,
    R2,
    R3,
    R4,
    R5,
}

impl RadioScale {
    pub fn label(self) -> &'static str {
        match self {
            RadioScale::R1 => "R1 (Minor)",
            RadioScale::R2 => "R2 (Moderate)",
            RadioScale::R3 => "R3 (Strong)",
            RadioScale::R4 => "R4 (Severe)",
            RadioScale::R5 => "R5 (Extreme)",
        }
    }
}

impl fmt::Display for RadioScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Events ────────────────────────────────────────────────────

/// Measurement carried by an alert, one variant per [`AlertKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AlertDetail {
    SevereStorm { kp: f64, level: StormLevel },
    Aurora { max_prob: f64 },
    ForecastStorm { kp: f64, noaa_scale: Option<String> },
    RadioBlackout { flux: f64, scale: RadioScale },
}

impl AlertDetail {
    pub fn kind(&self) -> AlertKind {
        match self {
            AlertDetail::SevereStorm { .. } => AlertKind::SevereGeomagneticStorm,
            AlertDetail::Aurora { .. } => AlertKind::AuroraVisibility,
            AlertDetail::ForecastStorm { .. } => AlertKind::ForecastStorm,
            AlertDetail::RadioBlackout { .. } => AlertKind::RadioBlackout,
        }
    }
}

/// A condition worth notifying about, produced once per cycle by a detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub detail: AlertDetail,
    /// Time tag of the observation as published by the feed.
    pub observed_at: Option<String>,
    /// Chat-ready message text.
    pub message: String,
}

impl AlertEvent {
    pub fn kind(&self) -> AlertKind {
        self.detail.kind()
    }
}
