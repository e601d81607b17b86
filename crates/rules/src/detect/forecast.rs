//! 3-day K-index forecast detector.

use serde_json::Value;

use spacewx_core::{AlertDetail, AlertEvent, AlertKind};

use super::{cell_number, data_rows, message, report, row_time, ParseError};

/// Minimum predicted Kp worth a heads-up.
pub const FORECAST_MIN_KP: f64 = 7.0;
/// Value of the prediction-type column for genuine forecasts (vs "observed"/"estimated").
pub const PREDICTED: &str = "predicted";

/// Rows are `[time_tag, kp, observed, noaa_scale]` after a header row.
///
/// Reports the predicted row with the highest Kp. On an exact Kp tie the
/// first such row in feed order wins; the feed's own ordering decides.
pub fn detect_forecast_storm(rows: &[Vec<Value>]) -> Option<AlertEvent> {
    report(AlertKind::ForecastStorm, evaluate_forecast_storm(rows))
}

pub fn evaluate_forecast_storm(rows: &[Vec<Value>]) -> Result<Option<AlertEvent>, ParseError> {
    let mut best: Option<(f64, &Vec<Value>)> = None;

    for (i, row) in data_rows(rows).iter().enumerate() {
        if row.get(2).and_then(Value::as_str) != Some(PREDICTED) {
            continue;
        }
        let kp = cell_number(row, i + 1, 1, "kp")?;
        if kp < FORECAST_MIN_KP {
            continue;
        }
        if best.map_or(true, |(best_kp, _)| kp > best_kp) {
            best = Some((kp, row));
        }
    }

    let Some((kp, row)) = best else {
        return Ok(None);
    };
    let observed_at = row_time(row).map(String::from);
    let noaa_scale = row.get(3).and_then(Value::as_str).map(String::from);

    Ok(Some(AlertEvent {
        message: message::forecast_storm(kp, noaa_scale.as_deref(), observed_at.as_deref()),
        detail: AlertDetail::ForecastStorm { kp, noaa_scale },
        observed_at,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn forecast(rows: &[(&str, &str, &str, Option<&str>)]) -> Vec<Vec<Value>> {
        let mut out = vec![vec![json!("time_tag"), json!("kp"), json!("observed"), json!("noaa_scale")]];
        for (time, kp, kind, scale) in rows {
            out.push(vec![json!(time), json!(kp), json!(kind), json!(scale)]);
        }
        out
    }

    fn kp_of(event: &AlertEvent) -> f64 {
        match event.detail {
            AlertDetail::ForecastStorm { kp, .. } => kp,
            ref other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn observed_rows_are_ignored() {
        let rows = forecast(&[
            ("t1", "4.67", "predicted", Some("G1")),
            ("t2", "7.33", "predicted", Some("G4")),
            ("t3", "9.0", "observed", Some("G5")),
        ]);
        let event = detect_forecast_storm(&rows).unwrap();
        assert_eq!(kp_of(&event), 7.33);
        assert_eq!(event.observed_at.as_deref(), Some("t2"));
        assert!(matches!(
            event.detail,
            AlertDetail::ForecastStorm { noaa_scale: Some(ref s), .. } if s == "G4"
        ));
    }

    #[test]
    fn picks_maximum_predicted_kp() {
        let rows = forecast(&[
            ("2026-09-01 00:00:00", "7.00", "predicted", Some("G3")),
            ("2026-09-01 03:00:00", "8.33", "predicted", Some("G4")),
            ("2026-09-01 06:00:00", "7.67", "predicted", Some("G3")),
        ]);
        let event = detect_forecast_storm(&rows).unwrap();
        assert_eq!(kp_of(&event), 8.33);
        assert!(event.message.contains("8.33"));
        assert!(event.message.contains("2026-09-01 03:00:00 UTC"));
    }

    #[test]
    fn exact_tie_keeps_first_row() {
        let rows = forecast(&[
            ("first", "7.67", "predicted", None),
            ("second", "7.67", "predicted", None),
        ]);
        let event = detect_forecast_storm(&rows).unwrap();
        assert_eq!(event.observed_at.as_deref(), Some("first"));
    }

    #[test]
    fn nothing_strong_enough() {
        let rows = forecast(&[
            ("t1", "6.99", "predicted", Some("G2")),
            ("t2", "3.00", "estimated", None),
        ]);
        assert!(detect_forecast_storm(&rows).is_none());
    }

    #[test]
    fn prediction_type_must_match_exactly() {
        let rows = forecast(&[("t1", "8.0", "Predicted", Some("G4")), ("t2", "8.0", "predicted ", None)]);
        assert!(detect_forecast_storm(&rows).is_none());
    }

    #[test]
    fn malformed_predicted_kp_is_a_parse_error() {
        let rows = forecast(&[("t1", "lots", "predicted", None)]);
        assert!(matches!(
            evaluate_forecast_storm(&rows),
            Err(ParseError::NotNumeric { row: 1, .. })
        ));
        assert!(detect_forecast_storm(&rows).is_none());
    }

    #[test]
    fn malformed_observed_kp_is_skipped() {
        let rows = forecast(&[("t1", "lots", "observed", None), ("t2", "7.5", "predicted", None)]);
        assert_eq!(detect_forecast_storm(&rows).map(|e| kp_of(&e)), Some(7.5));
    }

    #[test]
    fn detection_is_idempotent() {
        let rows = forecast(&[("t1", "7.33", "predicted", Some("G3"))]);
        assert_eq!(detect_forecast_storm(&rows), detect_forecast_storm(&rows));
    }
}
