//! Core library for `skylook`.
//!
//! This crate defines:
//! - The weather code → icon catalog
//! - Open-Meteo geocoding and forecast clients
//! - Normalization of raw forecast series into a [`WeatherSnapshot`]
//! - The [`SearchController`] state machine that runs a search end to end
//! - Configuration handling
//!
//! It is used by `skylook-cli`, but has no terminal concerns of its own.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;

pub use catalog::{IconId, icon_for};
pub use config::Config;
pub use controller::{SearchController, SearchState, SearchTicket};
pub use error::SearchError;
pub use model::{
    CurrentConditions, DayGroup, Forecast, HourlyByDay, HourlyReading, Location, RawDailySeries,
    RawHourlySeries, WeatherSnapshot,
};
pub use normalize::normalize;
pub use provider::{ForecastClient, GeocodingClient};
