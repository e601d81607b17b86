//! Observed geomagnetic storm detector (planetary K-index).

use serde_json::Value;

use spacewx_core::{AlertDetail, AlertEvent, AlertKind, StormLevel};

use super::{cell_number, data_rows, latest_by_time, message, report, row_time, ParseError};

/// Kp at which an observed storm is reported ("Strong", G3).
pub const STRONG_STORM_KP: f64 = 7.0;
/// Kp at which the level becomes "Severe" (G4).
pub const SEVERE_STORM_KP: f64 = 8.0;

/// Rows are `[time_tag, kp, a_running, station_count]` after a header row.
pub fn detect_severe_storm(rows: &[Vec<Value>]) -> Option<AlertEvent> {
    report(AlertKind::SevereGeomagneticStorm, evaluate_severe_storm(rows))
}

pub fn evaluate_severe_storm(rows: &[Vec<Value>]) -> Result<Option<AlertEvent>, ParseError> {
    let data = data_rows(rows);
    let Some((index, latest)) = latest_by_time(data, row_time) else {
        return Ok(None);
    };

    let kp = cell_number(latest, index + 1, 1, "kp")?;
    if kp < STRONG_STORM_KP {
        return Ok(None);
    }

    let level = if kp >= SEVERE_STORM_KP {
        StormLevel::Severe
    } else {
        StormLevel::Strong
    };
    let observed_at = row_time(latest).map(String::from);

    Ok(Some(AlertEvent {
        message: message::severe_storm(kp, level, observed_at.as_deref()),
        detail: AlertDetail::SevereStorm { kp, level },
        observed_at,
    }))
}
