//! Threshold detectors, one per alert kind.
//!
//! Every detector comes in two forms: `evaluate_*` returns the parse problem
//! as a [`ParseError`], `detect_*` logs it and folds it into "no alert" so a
//! single bad feed never takes the rest of a cycle down with it. Detectors
//! are pure: same document in, same answer out.

mod aurora;
mod forecast;
pub mod message;
mod storm;
mod xray;

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use spacewx_core::{AlertEvent, AlertKind, FeedShape, RawFeedDocument};

pub use self::aurora::{detect_aurora, evaluate_aurora, AURORA_MIN_PROBABILITY, NORTHERN_US_LATITUDE, NORTHERN_US_LONGITUDE};
pub use self::forecast::{detect_forecast_storm, evaluate_forecast_storm, FORECAST_MIN_KP, PREDICTED};
pub use self::storm::{detect_severe_storm, evaluate_severe_storm, SEVERE_STORM_KP, STRONG_STORM_KP};
pub use self::xray::{detect_radio_blackout, evaluate_radio_blackout, radio_scale, LONG_WAVE_CHANNEL};

/// A field in a feed document that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("row {row}: missing {field}")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: {field} is not a number: {value}")]
    NotNumeric {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("coordinate {index} is not a [lon, lat, prob] triple: {value}")]
    MalformedTriple { index: usize, value: String },

    #[error("{kind} cannot be evaluated against a {shape:?} document")]
    UnexpectedShape { kind: AlertKind, shape: FeedShape },
}

/// Run the detector for `kind` against a fetched document.
///
/// A document of the wrong shape counts as a parse problem and yields `None`.
pub fn detect(kind: AlertKind, document: &RawFeedDocument) -> Option<AlertEvent> {
    match (kind, document) {
        (AlertKind::SevereGeomagneticStorm, RawFeedDocument::Table(rows)) => detect_severe_storm(rows),
        (AlertKind::ForecastStorm, RawFeedDocument::Table(rows)) => detect_forecast_storm(rows),
        (AlertKind::AuroraVisibility, RawFeedDocument::Grid(grid)) => detect_aurora(grid),
        (AlertKind::RadioBlackout, RawFeedDocument::Samples(samples)) => detect_radio_blackout(samples),
        (kind, other) => report(
            kind,
            Err(ParseError::UnexpectedShape {
                kind,
                shape: other.shape(),
            }),
        ),
    }
}

/// Log a parse problem and treat it as "no alert".
pub(crate) fn report(kind: AlertKind, result: Result<Option<AlertEvent>, ParseError>) -> Option<AlertEvent> {
    match result {
        Ok(event) => event,
        Err(e) => {
            warn!(kind = %kind, error = %e, "could not evaluate feed, treating as no alert");
            None
        }
    }
}

// ── Shared helpers ────────────────────────────────────────────

/// Interpret a JSON cell as a finite decimal. SWPC publishes numbers both as
/// JSON numbers and as strings.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite())
}

/// Numeric cell `col` of a table row (`row` is the 1-based data row for diagnostics).
pub(crate) fn cell_number(cells: &[Value], row: usize, col: usize, field: &'static str) -> Result<f64, ParseError> {
    let value = cells.get(col).ok_or(ParseError::MissingField { row, field })?;
    number(value).ok_or_else(|| ParseError::NotNumeric {
        row,
        field,
        value: value.to_string(),
    })
}

const TIME_TAG_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse the time tag formats SWPC uses ("2024-05-10 21:00:00.000",
/// "2024-01-01T00:01:00Z").
pub(crate) fn parse_time_tag(tag: &str) -> Option<NaiveDateTime> {
    let tag = tag.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(tag) {
        return Some(dt.naive_utc());
    }
    TIME_TAG_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(tag, fmt).ok())
}

/// The chronologically latest item and its position.
///
/// Items whose tag does not parse rank below every parsed item; equal
/// timestamps resolve to the later item in document order.
pub(crate) fn latest_by_time<T>(items: &[T], tag: impl Fn(&T) -> Option<&str>) -> Option<(usize, &T)> {
    items
        .iter()
        .enumerate()
        .max_by_key(|(i, item)| (tag(item).and_then(parse_time_tag), *i))
}

/// Data rows of a header-first table.
pub(crate) fn data_rows(rows: &[Vec<Value>]) -> &[Vec<Value>] {
    rows.get(1..).unwrap_or_default()
}

/// Time tag in the first column of a table row.
pub(crate) fn row_time(row: &Vec<Value>) -> Option<&str> {
    row.first().and_then(Value::as_str)
}
