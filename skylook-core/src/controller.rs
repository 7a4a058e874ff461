//! Search lifecycle: one tagged state, driven by search/retry/select-day triggers.
//!
//! Every trigger that starts a search bumps a generation counter. Network
//! completions carry the generation they were started under and are dropped
//! unless it is still the current one, so a slow earlier search can never
//! overwrite the result of a later one.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::{
    sync::watch,
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, info, warn};

use crate::{
    Config,
    error::{NO_RESULTS_MESSAGE, SearchError},
    model::{DayGroup, Location, WeatherSnapshot},
    normalize::normalize,
    provider::{ForecastClient, GeocodingClient, clients_from_config},
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    ResolvingLocation {
        query: String,
    },
    LoadingForecast {
        location: Location,
    },
    /// Geocoding found nothing; the user should edit the query.
    NoResults {
        message: String,
    },
    /// A network stage failed; `retry` re-runs the last query.
    TransportError {
        message: String,
    },
    Ready {
        snapshot: Arc<WeatherSnapshot>,
        /// Always a key of `snapshot.hourly_by_day`. `None` only when the
        /// forecast carried no hourly readings at all.
        selected_day: Option<NaiveDate>,
    },
}

impl SearchState {
    pub fn name(&self) -> &'static str {
        match self {
            SearchState::Idle => "idle",
            SearchState::ResolvingLocation { .. } => "resolving-location",
            SearchState::LoadingForecast { .. } => "loading-forecast",
            SearchState::NoResults { .. } => "no-results",
            SearchState::TransportError { .. } => "transport-error",
            SearchState::Ready { .. } => "ready",
        }
    }

    /// A search is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SearchState::ResolvingLocation { .. } | SearchState::LoadingForecast { .. }
        )
    }

    /// States from which `retry` is allowed.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SearchState::NoResults { .. } | SearchState::TransportError { .. }
        )
    }

    pub fn snapshot(&self) -> Option<&Arc<WeatherSnapshot>> {
        match self {
            SearchState::Ready { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        match self {
            SearchState::Ready { selected_day, .. } => *selected_day,
            _ => None,
        }
    }

    /// Hourly readings of the selected day.
    pub fn selected_group(&self) -> Option<&DayGroup> {
        match self {
            SearchState::Ready {
                snapshot,
                selected_day: Some(day),
            } => snapshot.hourly_by_day.get(*day),
            _ => None,
        }
    }
}

/// Handle for one started search. Pass it to [`SearchController::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    last_query: Option<String>,
    in_flight: Option<AbortHandle>,
}

#[derive(Debug)]
pub struct SearchController {
    geocoder: Arc<dyn GeocodingClient>,
    forecaster: Arc<dyn ForecastClient>,
    inner: Mutex<Inner>,
    state: watch::Sender<SearchState>,
}

impl SearchController {
    pub fn new(geocoder: Arc<dyn GeocodingClient>, forecaster: Arc<dyn ForecastClient>) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            geocoder,
            forecaster,
            inner: Mutex::new(Inner::default()),
            state,
        }
    }

    /// Controller backed by the Open-Meteo clients configured in `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (geocoder, forecaster) = clients_from_config(config)?;
        Ok(Self::new(geocoder, forecaster))
    }

    pub fn current_state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    /// Query used by the most recent search, as it was trimmed.
    pub fn last_query(&self) -> Option<String> {
        self.inner.lock().last_query.clone()
    }

    /// Starts a new search, superseding any search still in flight.
    ///
    /// Returns `None` and leaves the state untouched when `query` is blank.
    pub fn search(&self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            debug!("ignoring blank search query");
            return None;
        }
        Some(self.begin(query.to_string()))
    }

    /// Re-issues the last query. Only valid after a failed search.
    pub fn retry(&self) -> Option<SearchTicket> {
        let query = {
            let inner = self.inner.lock();
            if !self.state.borrow().is_failure() {
                debug!(state = self.state.borrow().name(), "retry ignored");
                return None;
            }
            inner.last_query.clone()?
        };
        info!(query = %query, "retrying search");
        Some(self.begin(query))
    }

    /// Changes the selected day of a `Ready` state.
    ///
    /// Returns `false` and changes nothing if not `Ready` or `day` is not one
    /// of the snapshot's day keys.
    pub fn select_day(&self, day: NaiveDate) -> bool {
        let _inner = self.inner.lock();
        self.state.send_if_modified(|state| match state {
            SearchState::Ready {
                snapshot,
                selected_day,
            } if snapshot.hourly_by_day.contains(day) => {
                *selected_day = Some(day);
                true
            }
            _ => {
                debug!(%day, "day not selectable");
                false
            }
        })
    }

    /// Drives a search through geocoding, forecast and normalization.
    ///
    /// Completes quietly, without touching the state, once the ticket has been
    /// superseded.
    pub async fn run(&self, ticket: SearchTicket) {
        let SearchTicket { generation, query } = ticket;

        let location = match self.geocoder.resolve(&query).await {
            Ok(location) => location,
            Err(err) => {
                self.fail(generation, err);
                return;
            }
        };

        info!(query = %query, location = %location.label(), "location resolved");
        let loading = SearchState::LoadingForecast {
            location: location.clone(),
        };
        if !self.transition(generation, loading) {
            return;
        }

        let forecast = match self.forecaster.fetch_forecast(&location).await {
            Ok(forecast) => forecast,
            Err(err) => {
                self.fail(generation, err);
                return;
            }
        };

        let snapshot = normalize(&location, &forecast);
        let selected_day = snapshot.hourly_by_day.first_key();
        self.transition(
            generation,
            SearchState::Ready {
                snapshot: Arc::new(snapshot),
                selected_day,
            },
        );
    }

    /// [`search`](Self::search) on a spawned task. Aborts the previous spawned search.
    pub fn spawn_search(self: &Arc<Self>, query: &str) -> Option<JoinHandle<()>> {
        let ticket = self.search(query)?;
        Some(self.spawn_run(ticket))
    }

    /// [`retry`](Self::retry) on a spawned task.
    pub fn spawn_retry(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let ticket = self.retry()?;
        Some(self.spawn_run(ticket))
    }

    fn spawn_run(self: &Arc<Self>, ticket: SearchTicket) -> JoinHandle<()> {
        let generation = ticket.generation;
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run(ticket).await });

        let mut inner = self.inner.lock();
        if inner.generation == generation {
            inner.in_flight = Some(handle.abort_handle());
        } else {
            handle.abort();
        }
        handle
    }

    fn begin(&self, query: String) -> SearchTicket {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.last_query = Some(query.clone());
        if let Some(stale) = inner.in_flight.take() {
            stale.abort();
        }

        info!(query = %query, generation = inner.generation, "search started");
        self.state.send_replace(SearchState::ResolvingLocation {
            query: query.clone(),
        });

        SearchTicket {
            generation: inner.generation,
            query,
        }
    }

    fn fail(&self, generation: u64, err: SearchError) {
        let next = match err {
            SearchError::NoResults { query } => {
                info!(query = %query, "no places found");
                SearchState::NoResults {
                    message: NO_RESULTS_MESSAGE.to_string(),
                }
            }
            SearchError::Transport(err) => {
                let message = format!("{err:#}");
                warn!(error = %message, "search failed");
                SearchState::TransportError { message }
            }
        };
        self.transition(generation, next);
    }

    /// Publishes `next` if `generation` is still current.
    fn transition(&self, generation: u64, next: SearchState) -> bool {
        let inner = self.inner.lock();
        if inner.generation != generation {
            debug!(
                generation,
                current = inner.generation,
                discarded = next.name(),
                "dropping stale search result"
            );
            return false;
        }

        debug!(generation, state = next.name(), "state transition");
        self.state.send_replace(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, Forecast, RawDailySeries, RawHourlySeries};
    use async_trait::async_trait;
    use chrono::NaiveDateTime;

    #[derive(Debug)]
    struct FixedGeocoder;

    #[async_trait]
    impl GeocodingClient for FixedGeocoder {
        async fn resolve(&self, query: &str) -> Result<Location, SearchError> {
            if query == "nowhere" {
                return Err(SearchError::no_results(query));
            }
            Ok(Location {
                name: query.to_string(),
                country: "Testland".into(),
                latitude: 1.0,
                longitude: 2.0,
                timezone_id: "UTC".into(),
            })
        }
    }

    #[derive(Debug)]
    struct FixedForecaster;

    #[async_trait]
    impl ForecastClient for FixedForecaster {
        async fn fetch_forecast(&self, _location: &Location) -> Result<Forecast, SearchError> {
            let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").unwrap();
            Ok(Forecast {
                current: CurrentConditions {
                    time: t("2024-01-01T23:00"),
                    temperature: 1.0,
                    wind_speed: 2.0,
                    weather_code: None,
                },
                hourly: RawHourlySeries {
                    timestamps: vec![t("2024-01-01T23:00"), t("2024-01-02T00:00")],
                    temperature: vec![1.0, 0.5],
                    precipitation: vec![0.0, 0.0],
                    relative_humidity: vec![90.0, 91.0],
                    weather_code: vec![0, 3],
                },
                daily: RawDailySeries::default(),
                precipitation_unit: "mm".into(),
            })
        }
    }

    fn controller() -> SearchController {
        SearchController::new(Arc::new(FixedGeocoder), Arc::new(FixedForecaster))
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn starts_idle() {
        let c = controller();
        assert_eq!(c.current_state(), SearchState::Idle);
        assert!(c.last_query().is_none());
    }

    #[test]
    fn blank_query_is_a_no_op() {
        let c = controller();
        assert!(c.search("   ").is_none());
        assert_eq!(c.current_state(), SearchState::Idle);
    }

    #[test]
    fn search_trims_and_enters_resolving() {
        let c = controller();
        let ticket = c.search("  Oslo ").unwrap();

        assert_eq!(ticket.query(), "Oslo");
        assert_eq!(ticket.generation(), 1);
        assert_eq!(
            c.current_state(),
            SearchState::ResolvingLocation {
                query: "Oslo".into()
            }
        );
        assert_eq!(c.last_query().as_deref(), Some("Oslo"));
    }

    #[tokio::test]
    async fn successful_search_selects_first_day() {
        let c = controller();
        let ticket = c.search("Oslo").unwrap();
        c.run(ticket).await;

        let state = c.current_state();
        assert_eq!(state.name(), "ready");
        assert_eq!(state.selected_day(), Some(day("2024-01-01")));
        assert_eq!(state.selected_group().map(|g| g.readings.len()), Some(1));
        assert_eq!(state.snapshot().unwrap().location_label, "Oslo, Testland");
    }

    #[tokio::test]
    async fn select_day_only_accepts_known_keys() {
        let c = controller();
        assert!(!c.select_day(day("2024-01-02")), "not ready yet");

        let ticket = c.search("Oslo").unwrap();
        c.run(ticket).await;

        assert!(c.select_day(day("2024-01-02")));
        assert_eq!(c.current_state().selected_day(), Some(day("2024-01-02")));

        assert!(!c.select_day(day("2030-06-01")));
        assert_eq!(c.current_state().selected_day(), Some(day("2024-01-02")));
    }

    #[tokio::test]
    async fn no_results_then_retry() {
        let c = controller();
        assert!(c.retry().is_none(), "nothing to retry while idle");

        let ticket = c.search("nowhere").unwrap();
        c.run(ticket).await;
        assert_eq!(
            c.current_state(),
            SearchState::NoResults {
                message: NO_RESULTS_MESSAGE.into()
            }
        );

        let retry = c.retry().unwrap();
        assert_eq!(retry.query(), "nowhere");
        assert_eq!(retry.generation(), 2);
        assert!(c.current_state().is_busy());
    }

    #[tokio::test]
    async fn stale_ticket_cannot_publish() {
        let c = controller();
        let old = c.search("Oslo").unwrap();
        let new = c.search("Bergen").unwrap();

        c.run(old).await;
        assert_eq!(
            c.current_state(),
            SearchState::ResolvingLocation {
                query: "Bergen".into()
            }
        );

        c.run(new).await;
        assert_eq!(
            c.current_state().snapshot().unwrap().location_label,
            "Bergen, Testland"
        );
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let c = controller();
        let mut rx = c.subscribe();

        let ticket = c.search("Oslo").unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_busy());

        c.run(ticket).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().name(), "ready");
    }

    #[tokio::test]
    async fn spawned_search_completes() {
        let c = Arc::new(controller());
        let handle = c.spawn_search("Oslo").unwrap();
        handle.await.unwrap();
        assert_eq!(c.current_state().name(), "ready");

        assert!(c.spawn_search("").is_none());
        assert!(c.spawn_retry().is_none(), "ready is not a failure state");
    }
}
