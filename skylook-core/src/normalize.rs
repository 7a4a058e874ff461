//! Turns a geocoded location plus raw forecast series into a [`WeatherSnapshot`].
//!
//! Everything here is pure and synchronous. Inputs are expected to satisfy the
//! alignment invariant of the raw series; the forecast client rejects payloads
//! that don't, so a violation here is a bug and panics.

use chrono::NaiveDateTime;

use crate::{
    catalog::{self, IconId},
    model::{
        Forecast, HourlyByDay, HourlyReading, Location, RawDailySeries, RawHourlySeries,
        WeatherSnapshot,
    },
};

const DATE_LABEL_FORMAT: &str = "%A, %b %-d, %Y";

/// Index of the hourly timestamp equal to `current`.
///
/// Falls back to 0 when there is no exact match.
pub fn current_hour_index(timestamps: &[NaiveDateTime], current: NaiveDateTime) -> usize {
    timestamps.iter().position(|t| *t == current).unwrap_or(0)
}

/// Partitions the hourly series by local calendar date.
pub fn group_by_day(hourly: &RawHourlySeries) -> HourlyByDay {
    let mut by_day = HourlyByDay::default();

    for (i, ts) in hourly.timestamps.iter().enumerate() {
        by_day.push(
            ts.date(),
            HourlyReading {
                timestamp: *ts,
                temperature: hourly.temperature[i],
                icon: catalog::icon_for(hourly.weather_code[i]),
            },
        );
    }

    by_day
}

pub fn daily_icons(daily: &RawDailySeries) -> Vec<IconId> {
    daily.weather_code.iter().copied().map(catalog::icon_for).collect()
}

/// e.g. `Monday, Jan 1, 2024`
pub fn format_date_label(time: NaiveDateTime) -> String {
    time.format(DATE_LABEL_FORMAT).to_string()
}

/// Builds the snapshot for `location` from `forecast`.
///
/// # Panics
///
/// Panics if the hourly or daily series are not index-aligned.
pub fn normalize(location: &Location, forecast: &Forecast) -> WeatherSnapshot {
    let hourly = &forecast.hourly;
    let daily = &forecast.daily;

    assert!(
        hourly.is_aligned(),
        "hourly series arrays differ in length ({} timestamps)",
        hourly.len()
    );
    assert!(
        daily.is_aligned(),
        "daily series arrays differ in length ({} dates)",
        daily.len()
    );

    let idx = current_hour_index(&hourly.timestamps, forecast.current.time);
    let current_humidity = hourly.relative_humidity.get(idx).copied().unwrap_or_default();
    let current_precipitation = hourly.precipitation.get(idx).copied().unwrap_or_default();

    let daily_icons = daily_icons(daily);
    let current_icon = forecast
        .current
        .weather_code
        .map(catalog::icon_for)
        .or_else(|| daily_icons.first().copied())
        .unwrap_or_default();

    WeatherSnapshot {
        location_label: location.label(),
        current_date_label: format_date_label(forecast.current.time),
        timezone_id: location.timezone_id.clone(),
        current_temperature: forecast.current.temperature,
        wind_speed: forecast.current.wind_speed,
        current_humidity,
        current_precipitation,
        precipitation_unit: forecast.precipitation_unit.clone(),
        current_icon,
        daily: daily.clone(),
        daily_icons,
        hourly_by_day: group_by_day(hourly),
    }
}
