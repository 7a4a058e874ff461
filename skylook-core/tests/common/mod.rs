//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use skylook_core::{
    Config, CurrentConditions, Forecast, Location, RawDailySeries, RawHourlySeries,
};

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap()
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Config whose endpoints live on a mock server.
pub fn config_for(base_uri: &str) -> Config {
    Config {
        geocoding_url: format!("{base_uri}/v1/search"),
        forecast_url: format!("{base_uri}/v1/forecast"),
        ..Config::default()
    }
}

pub fn location(name: &str) -> Location {
    Location {
        name: name.to_string(),
        country: "Testland".into(),
        latitude: 10.0,
        longitude: 20.0,
        timezone_id: "Europe/Berlin".into(),
    }
}

pub fn berlin_geocoding_json() -> Value {
    json!({
        "results": [
            {
                "id": 2950159,
                "name": "Berlin",
                "latitude": 52.52,
                "longitude": 13.4,
                "elevation": 74.0,
                "timezone": "Europe/Berlin",
                "country": "Germany",
                "country_code": "DE"
            },
            {
                "id": 5083330,
                "name": "Berlin",
                "latitude": 44.46867,
                "longitude": -71.18508,
                "timezone": "America/New_York",
                "country": "United States",
                "country_code": "US"
            }
        ],
        "generationtime_ms": 0.9
    })
}

fn hourly_times(start: &str, hours: usize) -> Vec<NaiveDateTime> {
    let start = at(start);
    (0..hours).map(|h| start + Duration::hours(h as i64)).collect()
}

/// Forecast payload as the Open-Meteo API returns it.
pub fn forecast_json(start: &str, hours: usize, current: &str) -> Value {
    let times: Vec<String> = hourly_times(start, hours)
        .iter()
        .map(|t| t.format("%Y-%m-%dT%H:%M").to_string())
        .collect();
    let days: Vec<String> = {
        let mut days: Vec<String> = times.iter().map(|t| t[..10].to_string()).collect();
        days.dedup();
        days
    };

    json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "timezone": "Europe/Berlin",
        "timezone_abbreviation": "CET",
        "current_weather": {
            "time": current,
            "temperature": 7.4,
            "windspeed": 14.8,
            "winddirection": 240,
            "weathercode": 3,
            "is_day": 1
        },
        "hourly_units": {
            "time": "iso8601",
            "temperature_2m": "°C",
            "precipitation": "mm",
            "relative_humidity_2m": "%",
            "weathercode": "wmo code"
        },
        "hourly": {
            "time": times,
            "temperature_2m": (0..hours).map(|h| 2.0 + h as f64 * 0.25).collect::<Vec<_>>(),
            "precipitation": (0..hours).map(|h| if h % 4 == 0 { 0.3 } else { 0.0 }).collect::<Vec<_>>(),
            "relative_humidity_2m": (0..hours).map(|h| 60 + (h % 30) as i64).collect::<Vec<_>>(),
            "weathercode": (0..hours).map(|h| if h % 2 == 0 { 3 } else { 61 }).collect::<Vec<_>>()
        },
        "daily_units": {
            "time": "iso8601",
            "temperature_2m_max": "°C",
            "temperature_2m_min": "°C",
            "weathercode": "wmo code"
        },
        "daily": {
            "temperature_2m_max": days.iter().map(|_| 9.1).collect::<Vec<_>>(),
            "temperature_2m_min": days.iter().map(|_| 1.2).collect::<Vec<_>>(),
            "weathercode": days.iter().map(|_| 80).collect::<Vec<_>>(),
            "time": days
        }
    })
}

/// Already-parsed forecast, for fake clients.
pub fn forecast(start: &str, hours: usize, current: &str) -> Forecast {
    let timestamps = hourly_times(start, hours);
    let mut dates: Vec<NaiveDate> = timestamps.iter().map(|t| t.date()).collect();
    dates.dedup();

    Forecast {
        current: CurrentConditions {
            time: at(current),
            temperature: 7.4,
            wind_speed: 14.8,
            weather_code: Some(3),
        },
        hourly: RawHourlySeries {
            temperature: vec![5.0; hours],
            precipitation: vec![0.0; hours],
            relative_humidity: vec![70.0; hours],
            weather_code: vec![0; hours],
            timestamps,
        },
        daily: RawDailySeries {
            temperature_max: vec![9.1; dates.len()],
            temperature_min: vec![1.2; dates.len()],
            weather_code: vec![80; dates.len()],
            dates,
        },
        precipitation_unit: "mm".into(),
    }
}
