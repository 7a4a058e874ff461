use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::SearchError,
    model::{CurrentConditions, Forecast, Location, RawDailySeries, RawHourlySeries},
};

use super::{ForecastClient, GeocodingClient};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const USER_AGENT: &str = concat!("skylook/", env!("CARGO_PKG_VERSION"));
const HOURLY_FIELDS: &str = "temperature_2m,precipitation,relative_humidity_2m,weathercode";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weathercode";
/// Lets the forecast API pick the zone from the coordinates.
const AUTO_TIMEZONE: &str = "auto";

pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    http: Client,
    base_url: String,
    language: String,
    count: u8,
}

impl OpenMeteoGeocoder {
    pub fn new(http: Client, base_url: String, language: String, count: u8) -> Self {
        Self {
            http,
            base_url,
            language,
            count,
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<OmPlace>> {
        let count = self.count.max(1).to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("name", query),
                ("count", count.as_str()),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo geocoding response body")?;

        if !status.is_success() {
            bail!(
                "Open-Meteo geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            );
        }

        let parsed: OmGeocodingResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo geocoding JSON")?;

        Ok(parsed.results.unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoForecaster {
    http: Client,
    base_url: String,
}

impl OpenMeteoForecaster {
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    async fn fetch(&self, location: &Location) -> Result<Forecast> {
        let latitude = location.latitude.to_string();
        let longitude = location.longitude.to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("hourly", HOURLY_FIELDS),
                ("daily", DAILY_FIELDS),
                ("current_weather", "true"),
                ("timezone", location.timezone_id.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo forecast response body")?;

        if !status.is_success() {
            bail!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            );
        }

        let parsed: OmForecastResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        parsed.into_forecast()
    }
}

#[async_trait]
impl GeocodingClient for OpenMeteoGeocoder {
    async fn resolve(&self, query: &str) -> Result<Location, SearchError> {
        debug!(query, "geocoding");

        let place = self
            .search(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::no_results(query))?;

        Ok(place.into())
    }
}

#[async_trait]
impl ForecastClient for OpenMeteoForecaster {
    async fn fetch_forecast(&self, location: &Location) -> Result<Forecast, SearchError> {
        debug!(
            latitude = location.latitude,
            longitude = location.longitude,
            timezone = %location.timezone_id,
            "fetching forecast"
        );

        Ok(self.fetch(location).await?)
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    // Omitted entirely when nothing matched.
    #[serde(default)]
    results: Option<Vec<OmPlace>>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: Option<String>,
}

impl From<OmPlace> for Location {
    fn from(place: OmPlace) -> Self {
        Location {
            name: place.name,
            country: place.country.unwrap_or_default(),
            latitude: place.latitude,
            longitude: place.longitude,
            timezone_id: place.timezone.unwrap_or_else(|| AUTO_TIMEZONE.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    #[serde(deserialize_with = "local_time::deserialize")]
    time: NaiveDateTime,
    temperature: f64,
    windspeed: f64,
    #[serde(default)]
    weathercode: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    #[serde(deserialize_with = "local_time::deserialize_vec")]
    time: Vec<NaiveDateTime>,
    temperature_2m: Vec<f64>,
    precipitation: Vec<f64>,
    relative_humidity_2m: Vec<f64>,
    weathercode: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct OmHourlyUnits {
    precipitation: String,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    weathercode: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: OmCurrentWeather,
    hourly: OmHourly,
    hourly_units: OmHourlyUnits,
    daily: OmDaily,
}

impl OmForecastResponse {
    fn into_forecast(self) -> Result<Forecast> {
        let hourly = RawHourlySeries {
            timestamps: self.hourly.time,
            temperature: self.hourly.temperature_2m,
            precipitation: self.hourly.precipitation,
            relative_humidity: self.hourly.relative_humidity_2m,
            weather_code: self.hourly.weathercode,
        };
        if !hourly.is_aligned() {
            return Err(anyhow!(
                "Open-Meteo hourly series have mismatched lengths ({} timestamps)",
                hourly.len()
            ));
        }

        let daily = RawDailySeries {
            dates: self.daily.time,
            temperature_max: self.daily.temperature_2m_max,
            temperature_min: self.daily.temperature_2m_min,
            weather_code: self.daily.weathercode,
        };
        if !daily.is_aligned() {
            return Err(anyhow!(
                "Open-Meteo daily series have mismatched lengths ({} dates)",
                daily.len()
            ));
        }

        Ok(Forecast {
            current: CurrentConditions {
                time: self.current_weather.time,
                temperature: self.current_weather.temperature,
                wind_speed: self.current_weather.windspeed,
                weather_code: self.current_weather.weathercode,
            },
            hourly,
            daily,
            precipitation_unit: self.hourly_units.precipitation,
        })
    }
}

/// Open-Meteo sends local times as `2024-01-01T13:00`, without seconds or offset.
mod local_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn parse(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn deserialize_vec<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<NaiveDateTime>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.iter()
            .map(|s| parse(s).map_err(D::Error::custom))
            .collect()
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
