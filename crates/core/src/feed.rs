//! Feed identifiers and the raw documents they return.
//!
//! Documents are kept deliberately loose (`serde_json::Value` cells) so that
//! a single odd value in a feed surfaces as a detector-level parse problem
//! instead of failing the whole fetch.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::alert::AlertKind;

/// One of the public SWPC data series the bot polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feed {
    /// Observed planetary K-index, 3-hour cadence.
    KpIndex,
    /// 3-day planetary K-index forecast.
    KpForecast,
    /// OVATION aurora probability grid.
    AuroraGrid,
    /// GOES primary X-ray flux, last 6 hours.
    XrayFlux,
}

impl Feed {
    pub const ALL: [Feed; 4] = [Feed::KpIndex, Feed::KpForecast, Feed::AuroraGrid, Feed::XrayFlux];

    /// The feed a given alert kind is evaluated against.
    pub fn for_kind(kind: AlertKind) -> Feed {
        match kind {
            AlertKind::SevereGeomagneticStorm => Feed::KpIndex,
            AlertKind::ForecastStorm => Feed::KpForecast,
            AlertKind::AuroraVisibility => Feed::AuroraGrid,
            AlertKind::RadioBlackout => Feed::XrayFlux,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Feed::KpIndex => "kp-index",
            Feed::KpForecast => "kp-forecast",
            Feed::AuroraGrid => "aurora-grid",
            Feed::XrayFlux => "xray-flux",
        }
    }

    pub fn shape(self) -> FeedShape {
        match self {
            Feed::KpIndex | Feed::KpForecast => FeedShape::Table,
            Feed::AuroraGrid => FeedShape::Grid,
            Feed::XrayFlux => FeedShape::Samples,
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structural layout of a feed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedShape {
    /// Array of rows, first row is a header.
    Table,
    /// Object with a `coordinates` array of `[lon, lat, prob]` triples.
    Grid,
    /// Array of objects with `time_tag`, `flux` and `energy`.
    Samples,
}

// ── Documents ─────────────────────────────────────────────────

/// OVATION aurora grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuroraGrid {
    #[serde(rename = "Forecast Time", default)]
    pub forecast_time: Option<String>,
    #[serde(default)]
    pub coordinates: Vec<Value>,
}

/// One GOES X-ray flux reading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XraySample {
    #[serde(default)]
    pub time_tag: Option<String>,
    #[serde(default)]
    pub flux: Option<Value>,
    #[serde(default)]
    pub energy: Option<String>,
}

/// The unparsed result of a single fetch, owned by one polling cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFeedDocument {
    Table(Vec<Vec<Value>>),
    Grid(AuroraGrid),
    Samples(Vec<XraySample>),
}

impl RawFeedDocument {
    /// Decode a response body according to the feed's layout.
    pub fn parse(feed: Feed, body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match feed.shape() {
            FeedShape::Table => RawFeedDocument::Table(serde_json::from_slice(body)?),
            FeedShape::Grid => RawFeedDocument::Grid(serde_json::from_slice(body)?),
            FeedShape::Samples => RawFeedDocument::Samples(serde_json::from_slice(body)?),
        })
    }

    pub fn shape(&self) -> FeedShape {
        match self {
            RawFeedDocument::Table(_) => FeedShape::Table,
            RawFeedDocument::Grid(_) => FeedShape::Grid,
            RawFeedDocument::Samples(_) => FeedShape::Samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_feed() {
        let feeds: Vec<Feed> = AlertKind::ALL.into_iter().map(Feed::for_kind).collect();
        for feed in Feed::ALL {
            assert!(feeds.contains(&feed), "{feed} has no alert kind");
        }
    }

    #[test]
    fn parse_kp_table() {
        let body = br#"[["time_tag","Kp","a_running","station_count"],["2024-05-10 21:00:00.000","8.67","207","8"]]"#;
        let doc = RawFeedDocument::parse(Feed::KpIndex, body).unwrap();
        match doc {
            RawFeedDocument::Table(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[1][1], Value::String("8.67".into()));
            }
            other => panic!("unexpected document {other:?}"),
        }
    }

    #[test]
    fn parse_aurora_grid_ignores_extra_fields() {
        let body = br#"{"Observation Time":"2024-05-10T21:00:00Z","Forecast Time":"2024-05-10T22:00:00Z","Data Format":"[Longitude, Latitude, Aurora]","coordinates":[[260,45,30]]}"#;
        let doc = RawFeedDocument::parse(Feed::AuroraGrid, body).unwrap();
        let RawFeedDocument::Grid(grid) = doc else {
            panic!("expected grid");
        };
        assert_eq!(grid.forecast_time.as_deref(), Some("2024-05-10T22:00:00Z"));
        assert_eq!(grid.coordinates.len(), 1);
    }

    #[test]
    fn parse_xray_samples_tolerates_null_flux() {
        let body = br#"[{"time_tag":"2024-01-01T00:00:00Z","satellite":16,"flux":null,"energy":"0.1-0.8nm"}]"#;
        let doc = RawFeedDocument::parse(Feed::XrayFlux, body).unwrap();
        let RawFeedDocument::Samples(samples) = doc else {
            panic!("expected samples");
        };
        assert_eq!(samples[0].energy.as_deref(), Some("0.1-0.8nm"));
        assert!(samples[0].flux.is_none() || samples[0].flux == Some(Value::Null));
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(RawFeedDocument::parse(Feed::KpIndex, br#"{"coordinates":[]}"#).is_err());
        assert!(RawFeedDocument::parse(Feed::XrayFlux, b"<html>").is_err());
    }
}
