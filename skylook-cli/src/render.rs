use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};
use skylook_core::{DayGroup, SearchState, WeatherSnapshot};

/// Text for states other than `Ready`.
pub fn render_status(state: &SearchState) -> String {
    match state {
        SearchState::Idle => "Search for a place to see its weather.".to_string(),
        SearchState::ResolvingLocation { query } => format!("Search in progress: {query}"),
        SearchState::LoadingForecast { location } => format!("Loading... {}", location.label()),
        SearchState::NoResults { message } => message.clone(),
        SearchState::TransportError { message } => format!(
            "Something went wrong\n\
             We couldn't connect to the server (API error). Please try again in a few moments.\n\
             ({message})"
        ),
        SearchState::Ready { snapshot, .. } => snapshot.location_label.clone(),
    }
}

pub fn render_snapshot(snapshot: &WeatherSnapshot, selected_day: Option<NaiveDate>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", snapshot.location_label);
    let _ = writeln!(out, "{} ({})", snapshot.current_date_label, snapshot.timezone_id);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {}  {}",
        degrees(snapshot.current_temperature),
        snapshot.current_icon
    );
    let _ = writeln!(out, "  Humidity       {}%", snapshot.current_humidity);
    let _ = writeln!(out, "  Wind           {} km/h", snapshot.wind_speed);
    let _ = writeln!(
        out,
        "  Precipitation  {} {}",
        snapshot.current_precipitation, snapshot.precipitation_unit
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "Daily forecast");
    let daily = &snapshot.daily;
    for (i, date) in daily.dates.iter().enumerate() {
        let icon = snapshot.daily_icons.get(i).copied().unwrap_or_default();
        let _ = writeln!(
            out,
            "  {}  {:<14} {:>4} {:>4}",
            date.format("%a"),
            icon.as_str(),
            degrees(daily.temperature_max[i]),
            degrees(daily.temperature_min[i]),
        );
    }

    if let Some(group) = selected_day.and_then(|d| snapshot.hourly_by_day.get(d)) {
        let _ = writeln!(out);
        out.push_str(&render_hours(group));
    }

    out
}

fn render_hours(group: &DayGroup) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hourly forecast ({})", group.date.format("%A"));
    for reading in &group.readings {
        let _ = writeln!(
            out,
            "  {:>5}  {:<14} {:>4}",
            hour_label(reading.timestamp),
            reading.icon.as_str(),
            degrees(reading.temperature),
        );
    }
    out
}

/// `3 PM`, `12 AM`
pub fn hour_label(ts: NaiveDateTime) -> String {
    ts.format("%-I %p").to_string()
}

/// Temperatures are shown floored, as whole degrees.
pub fn degrees(value: f64) -> String {
    format!("{}°", value.floor() as i64)
}
