//! OVATION aurora visibility detector for the northern United States.

use std::ops::RangeInclusive;

use serde_json::Value;

use spacewx_core::{AlertDetail, AlertEvent, AlertKind, AuroraGrid};

use super::{message, number, report, ParseError};

/// Latitude band of the northern US box, degrees north.
pub const NORTHERN_US_LATITUDE: RangeInclusive<f64> = 40.0..=50.0;
/// Longitude band of the northern US box, degrees east on the 0-360 grid.
pub const NORTHERN_US_LONGITUDE: RangeInclusive<f64> = 235.0..=295.0;
/// Lowest in-box probability (percent) that is reported.
pub const AURORA_MIN_PROBABILITY: f64 = 20.0;

pub fn detect_aurora(grid: &AuroraGrid) -> Option<AlertEvent> {
    report(AlertKind::AuroraVisibility, evaluate_aurora(grid))
}

/// Any malformed coordinate aborts the whole grid.
pub fn evaluate_aurora(grid: &AuroraGrid) -> Result<Option<AlertEvent>, ParseError> {
    let mut max_prob: Option<f64> = None;

    for (index, point) in grid.coordinates.iter().enumerate() {
        let (lon, lat, prob) = triple(index, point)?;
        if NORTHERN_US_LATITUDE.contains(&lat) && NORTHERN_US_LONGITUDE.contains(&lon) {
            max_prob = Some(max_prob.map_or(prob, |m| m.max(prob)));
        }
    }

    match max_prob {
        Some(max_prob) if max_prob >= AURORA_MIN_PROBABILITY => Ok(Some(AlertEvent {
            detail: AlertDetail::Aurora { max_prob },
            observed_at: grid.forecast_time.clone(),
            message: message::aurora(max_prob),
        })),
        _ => Ok(None),
    }
}

fn triple(index: usize, point: &Value) -> Result<(f64, f64, f64), ParseError> {
    let malformed = || ParseError::MalformedTriple {
        index,
        value: point.to_string(),
    };
    let cells = point.as_array().ok_or_else(malformed)?;
    match cells.as_slice() {
        [lon, lat, prob, ..] => Ok((
            number(lon).ok_or_else(malformed)?,
            number(lat).ok_or_else(malformed)?,
            number(prob).ok_or_else(malformed)?,
        )),
        _ => Err(malformed()),
    }
}
