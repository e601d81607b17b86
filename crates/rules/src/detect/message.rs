//! Human-readable alert text, as posted to the channel.

use spacewx_core::{RadioScale, StormLevel};

fn time_or_unknown(time: Option<&str>) -> &str {
    time.unwrap_or("unknown")
}

pub fn severe_storm(kp: f64, level: StormLevel, time: Option<&str>) -> String {
    format!(
        "⚠️ **{upper} SPACE WEATHER ALERT** ⚠️\n\
         Planetary K-index has reached **{kp:.2}** ({label}).\n\
         Time: {time}\n\
         Systems may be affected. Auroras likely visible at lower latitudes.",
        upper = level.label().to_uppercase(),
        label = level.label(),
        time = time_or_unknown(time),
    )
}

pub fn aurora(max_prob: f64) -> String {
    format!(
        "🌌 **AURORA FORECAST ALERT** 🌌\n\
         High probability of aurora visibility in Northern US!\n\
         Forecast Max Probability: **{max_prob}%** in the region.\n\
         Keep an eye on the sky tonight!"
    )
}

pub fn forecast_storm(kp: f64, noaa_scale: Option<&str>, time: Option<&str>) -> String {
    let scale = noaa_scale.map(|s| format!(" ({s})")).unwrap_or_default();
    format!(
        "🔮 **SPACE WEATHER FORECAST** 🔮\n\
         A strong geomagnetic storm is predicted!\n\
         Predicted K-Index: **{kp:.2}**{scale}\n\
         Time of Peak: {time} UTC\n\
         Prepare for potential aurora activity in the coming days.",
        time = time_or_unknown(time),
    )
}

pub fn radio_blackout(flux: f64, scale: RadioScale, time: Option<&str>) -> String {
    format!(
        "☢️ **RADIO BLACKOUT ALERT** ☢️\n\
         Solar X-ray Flux has reached **{label}** levels.\n\
         Flux: **{flux:.1e}**\n\
         Time: {time}\n\
         HF Radio communications on the sunlit side of Earth may be degraded or lost.",
        label = scale.label(),
        time = time_or_unknown(time),
    )
}
