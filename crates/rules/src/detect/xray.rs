//! GOES X-ray flux detector (NOAA R-scale radio blackouts).

use spacewx_core::{AlertDetail, AlertEvent, AlertKind, RadioScale, XraySample};

use super::{latest_by_time, message, number, report, ParseError};

/// Long-wavelength channel the R-scale is defined on.
pub const LONG_WAVE_CHANNEL: &str = "0.1-0.8nm";

/// Lower flux bound (W/m²) for each scale, strongest first.
const SCALE_THRESHOLDS: [(f64, RadioScale); 5] = [
    (2e-3, RadioScale::R5),
    (1e-3, RadioScale::R4),
    (1e-4, RadioScale::R3),
    (5e-5, RadioScale::R2),
    (1e-5, RadioScale::R1),
];

/// Map a long-wave flux to its radio-blackout scale, if any.
pub fn radio_scale(flux: f64) -> Option<RadioScale> {
    SCALE_THRESHOLDS
        .iter()
        .find(|(min, _)| flux >= *min)
        .map(|(_, scale)| *scale)
}

pub fn detect_radio_blackout(samples: &[XraySample]) -> Option<AlertEvent> {
    report(AlertKind::RadioBlackout, evaluate_radio_blackout(samples))
}

/// Only the latest long-wave sample is considered.
pub fn evaluate_radio_blackout(samples: &[XraySample]) -> Result<Option<AlertEvent>, ParseError> {
    let long_wave: Vec<(usize, &XraySample)> = samples
        .iter()
        .enumerate()
        .filter(|(_, s)| s.energy.as_deref() == Some(LONG_WAVE_CHANNEL))
        .collect();

    let Some((_, &(index, latest))) = latest_by_time(&long_wave, |(_, s)| s.time_tag.as_deref()) else {
        return Ok(None);
    };

    // Position in the feed, counting every channel.
    let row = index + 1;
    let value = latest
        .flux
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or(ParseError::MissingField { row, field: "flux" })?;
    let flux = number(value).ok_or_else(|| ParseError::NotNumeric {
        row,
        field: "flux",
        value: value.to_string(),
    })?;

    let Some(scale) = radio_scale(flux) else {
        return Ok(None);
    };
    let observed_at = latest.time_tag.clone();

    Ok(Some(AlertEvent {
        message: message::radio_blackout(flux, scale, observed_at.as_deref()),
        detail: AlertDetail::RadioBlackout { flux, scale },
        observed_at,
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample(time: &str, flux: f64, energy: &str) -> XraySample {
        XraySample {
            time_tag: Some(time.into()),
            flux: Some(json!(flux)),
            energy: Some(energy.into()),
        }
    }

    fn scale_of(event: &AlertEvent) -> RadioScale {
        match event.detail {
            AlertDetail::RadioBlackout { scale, .. } => scale,
            ref other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn scale_boundaries() {
        assert_eq!(radio_scale(9.9e-6), None);
        assert_eq!(radio_scale(1e-5), Some(RadioScale::R1));
        assert_eq!(radio_scale(4.9e-5), Some(RadioScale::R1));
        assert_eq!(radio_scale(5e-5), Some(RadioScale::R2));
        assert_eq!(radio_scale(1e-4), Some(RadioScale::R3));
        assert_eq!(radio_scale(1e-3), Some(RadioScale::R4));
        assert_eq!(radio_scale(2e-3), Some(RadioScale::R5));
        assert_eq!(radio_scale(1.0), Some(RadioScale::R5));
    }

    #[test]
    fn low_flux_is_quiet() {
        let samples = vec![
            sample("2024-01-01T00:00:00Z", 1e-6, LONG_WAVE_CHANNEL),
            sample("2024-01-01T00:01:00Z", 9.9e-6, LONG_WAVE_CHANNEL),
        ];
        assert!(detect_radio_blackout(&samples).is_none());
    }

    #[test]
    fn minor_blackout() {
        let samples = vec![
            sample("2024-01-01T00:00:00Z", 1e-6, LONG_WAVE_CHANNEL),
            sample("2024-01-01T00:01:00Z", 1.5e-5, LONG_WAVE_CHANNEL),
        ];
        let event = detect_radio_blackout(&samples).unwrap();
        assert_eq!(scale_of(&event), RadioScale::R1);
        assert_eq!(scale_of(&event).label(), "R1 (Minor)");
        assert_eq!(event.observed_at.as_deref(), Some("2024-01-01T00:01:00Z"));
        assert!(matches!(event.detail, AlertDetail::RadioBlackout { flux, .. } if flux == 1.5e-5));
    }

    #[test]
    fn strong_blackout() {
        let samples = vec![
            sample("2024-01-01T00:00:00Z", 1e-6, LONG_WAVE_CHANNEL),
            sample("2024-01-01T00:01:00Z", 2e-4, LONG_WAVE_CHANNEL),
        ];
        let event = detect_radio_blackout(&samples).unwrap();
        assert_eq!(scale_of(&event).label(), "R3 (Strong)");
    }

    #[test]
    fn other_channels_are_ignored() {
        let samples = vec![sample("2024-01-01T00:00:00Z", 1.0, "0.05-0.4nm")];
        assert!(detect_radio_blackout(&samples).is_none());
    }

    #[test]
    fn latest_long_wave_sample_wins_over_interleaved_short_wave() {
        let samples = vec![
            sample("2024-01-01T00:00:00Z", 3e-4, LONG_WAVE_CHANNEL),
            sample("2024-01-01T00:00:00Z", 1e-7, "0.05-0.4nm"),
            sample("2024-01-01T00:01:00Z", 2e-6, LONG_WAVE_CHANNEL),
            sample("2024-01-01T00:01:00Z", 1.0, "0.05-0.4nm"),
        ];
        assert!(detect_radio_blackout(&samples).is_none());
    }

    #[test]
    fn null_flux_on_latest_sample_is_a_parse_error() {
        let samples = vec![
            sample("2024-01-01T00:00:00Z", 3e-4, LONG_WAVE_CHANNEL),
            XraySample {
                time_tag: Some("2024-01-01T00:01:00Z".into()),
                flux: Some(json!(null)),
                energy: Some(LONG_WAVE_CHANNEL.into()),
            },
        ];
        assert_eq!(
            evaluate_radio_blackout(&samples),
            Err(ParseError::MissingField { row: 2, field: "flux" })
        );
        assert!(detect_radio_blackout(&samples).is_none());
    }

    #[test]
    fn parse_error_row_counts_every_channel() {
        let samples = vec![
            sample("2024-01-01T00:00:00Z", 1e-7, "0.05-0.4nm"),
            sample("2024-01-01T00:00:00Z", 3e-4, LONG_WAVE_CHANNEL),
            sample("2024-01-01T00:01:00Z", 1e-7, "0.05-0.4nm"),
            XraySample {
                time_tag: Some("2024-01-01T00:01:00Z".into()),
                flux: Some(json!("bright")),
                energy: Some(LONG_WAVE_CHANNEL.into()),
            },
        ];
        assert_eq!(
            evaluate_radio_blackout(&samples),
            Err(ParseError::NotNumeric {
                row: 4,
                field: "flux",
                value: "\"bright\"".into()
            })
        );
    }

    #[test]
    fn detection_is_idempotent() {
        let samples = vec![
            sample("2024-01-01T00:00:00Z", 1e-6, LONG_WAVE_CHANNEL),
            sample("2024-01-01T00:01:00Z", 6e-5, LONG_WAVE_CHANNEL),
        ];
        let first = detect_radio_blackout(&samples);
        assert!(first.is_some());
        assert_eq!(first, detect_radio_blackout(&samples));
    }

    #[test]
    fn empty_series_is_quiet() {
        assert_eq!(evaluate_radio_blackout(&[]), Ok(None));
    }
}
