use crate::{
    Config,
    error::SearchError,
    model::{Forecast, Location},
    provider::open_meteo::{OpenMeteoForecaster, OpenMeteoGeocoder},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod open_meteo;

/// Resolves a free-text place name to a [`Location`].
#[async_trait]
pub trait GeocodingClient: Send + Sync + Debug {
    /// Returns the first match for `query`.
    ///
    /// Fails with [`SearchError::NoResults`] when the upstream has no match and
    /// with [`SearchError::Transport`] for anything else.
    async fn resolve(&self, query: &str) -> Result<Location, SearchError>;
}

/// Fetches current, hourly and daily weather for a [`Location`].
#[async_trait]
pub trait ForecastClient: Send + Sync + Debug {
    /// Timestamps in the result are local to `location.timezone_id`.
    async fn fetch_forecast(&self, location: &Location) -> Result<Forecast, SearchError>;
}

/// Build both network collaborators from config, sharing one HTTP client.
pub fn clients_from_config(
    config: &Config,
) -> anyhow::Result<(Arc<dyn GeocodingClient>, Arc<dyn ForecastClient>)> {
    let http = open_meteo::http_client()?;

    let geocoder = OpenMeteoGeocoder::new(
        http.clone(),
        config.geocoding_url.clone(),
        config.language.clone(),
        config.result_count,
    );
    let forecaster = OpenMeteoForecaster::new(http, config.forecast_url.clone());

    Ok((Arc::new(geocoder), Arc::new(forecaster)))
}
