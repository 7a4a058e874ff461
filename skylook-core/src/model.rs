use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::catalog::IconId;

/// A place resolved by geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone id, e.g. `Europe/Berlin`.
    pub timezone_id: String,
}

impl Location {
    /// `"Berlin, Germany"`, or just the name when the country is unknown.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// Observation from the forecast's current-weather block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Local time in the location's timezone.
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub wind_speed: f64,
    pub weather_code: Option<i32>,
}

/// Hourly values as parallel, index-aligned arrays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawHourlySeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub temperature: Vec<f64>,
    pub precipitation: Vec<f64>,
    pub relative_humidity: Vec<f64>,
    pub weather_code: Vec<i32>,
}

impl RawHourlySeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        let n = self.timestamps.len();
        self.temperature.len() == n
            && self.precipitation.len() == n
            && self.relative_humidity.len() == n
            && self.weather_code.len() == n
    }
}

/// Daily values as parallel, index-aligned arrays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawDailySeries {
    pub dates: Vec<NaiveDate>,
    pub temperature_max: Vec<f64>,
    pub temperature_min: Vec<f64>,
    pub weather_code: Vec<i32>,
}

impl RawDailySeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        let n = self.dates.len();
        self.temperature_max.len() == n
            && self.temperature_min.len() == n
            && self.weather_code.len() == n
    }
}

/// Everything the forecast endpoint returns for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub current: CurrentConditions,
    pub hourly: RawHourlySeries,
    pub daily: RawDailySeries,
    /// Unit label of the hourly precipitation values, e.g. `mm`.
    pub precipitation_unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyReading {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub icon: IconId,
}

/// Readings that share one local calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub readings: Vec<HourlyReading>,
}

/// Day groups in the order their dates were first seen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourlyByDay {
    groups: Vec<DayGroup>,
}

impl HourlyByDay {
    /// Appends `reading` to the group for `date`, opening a new group if needed.
    pub(crate) fn push(&mut self, date: NaiveDate, reading: HourlyReading) {
        match self.groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.readings.push(reading),
            None => self.groups.push(DayGroup {
                date,
                readings: vec![reading],
            }),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayGroup> {
        self.groups.iter().find(|g| g.date == date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.groups.iter().map(|g| g.date)
    }

    pub fn first_key(&self) -> Option<NaiveDate> {
        self.groups.first().map(|g| g.date)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DayGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total readings across all groups.
    pub fn reading_count(&self) -> usize {
        self.groups.iter().map(|g| g.readings.len()).sum()
    }
}

impl<'a> IntoIterator for &'a HourlyByDay {
    type Item = &'a DayGroup;
    type IntoIter = std::slice::Iter<'a, DayGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Normalized view model published once a search succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_label: String,
    /// Long-form date of the current observation, e.g. `Monday, Jan 1, 2024`.
    pub current_date_label: String,
    pub timezone_id: String,
    pub current_temperature: f64,
    pub wind_speed: f64,
    pub current_humidity: f64,
    pub current_precipitation: f64,
    pub precipitation_unit: String,
    pub current_icon: IconId,
    pub daily: RawDailySeries,
    /// One icon per entry of `daily`.
    pub daily_icons: Vec<IconId>,
    pub hourly_by_day: HourlyByDay,
}
