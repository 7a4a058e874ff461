use thiserror::Error;

/// Message shown when geocoding finds nothing for a query.
pub const NO_RESULTS_MESSAGE: &str = "No search results found!";

/// Failure of one of the two network stages of a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The geocoder answered, but with zero matches.
    #[error("no places found for '{query}'")]
    NoResults { query: String },

    /// The request failed, returned a non-success status, or carried a payload
    /// that could not be parsed.
    #[error("transport failure: {0:#}")]
    Transport(anyhow::Error),
}

impl SearchError {
    pub fn no_results(query: impl Into<String>) -> Self {
        Self::NoResults {
            query: query.into(),
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, Self::NoResults { .. })
    }
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Transport(err)
    }
}
