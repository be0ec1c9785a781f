//! Forecast message rendering.

use crate::weather::types::{ForecastEntry, ForecastSeries};

/// 3-hour steps per daily message: eight entries cover the next 24 hours.
const ENTRIES_PER_MESSAGE: usize = 8;

/// Render the daily forecast message for a subscriber.
///
/// Timestamps come from the provider in UTC; the subscriber's offset is
/// applied exactly once, here, to show local wall-clock times.
pub fn render_forecast(series: &ForecastSeries, utc_offset_hours: i32) -> String {
    let mut out = String::from("Forecast for the next 24 hours:\n");
    for entry in series.list.iter().take(ENTRIES_PER_MESSAGE) {
        out.push_str(&render_entry(entry, utc_offset_hours));
        out.push('\n');
    }
    if series.list.is_empty() {
        out.push_str("No forecast data available.\n");
    }
    out
}

fn render_entry(entry: &ForecastEntry, utc_offset_hours: i32) -> String {
    let description = entry
        .weather
        .first()
        .map(|w| w.description.as_str())
        .unwrap_or("no description");
    format!(
        "{} {:>5.1}°C, {}, wind {:.1} m/s, rain {:.0}%",
        local_hhmm(entry.dt, utc_offset_hours),
        entry.main.temp,
        description,
        entry.wind.speed,
        entry.pop * 100.0,
    )
}

/// Local `HH:MM` for a UTC unix timestamp at a whole-hour offset.
pub fn local_hhmm(dt: i64, utc_offset_hours: i32) -> String {
    let local = dt + i64::from(utc_offset_hours) * 3600;
    let secs_of_day = local.rem_euclid(86_400);
    format!("{:02}:{:02}", secs_of_day / 3600, (secs_of_day % 3600) / 60)
}
