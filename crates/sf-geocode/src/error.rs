//! Geocoding error types.

use thiserror::Error;

/// Failure of a single address lookup.
///
/// Every variant is a per-request outcome: the caller reports the address
/// as not found and moves on.  Nothing here is retried.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeocodeError {
    #[error("no location found for {query:?}")]
    NotFound { query: String },

    #[error("geocoding request timed out after {timeout_ms} ms")]
    TimedOut { timeout_ms: u128 },

    #[error("geocoding service is rate limiting requests")]
    Throttled,

    #[error("geocoding service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error talking to {url}: {message}")]
    Network { url: String, message: String },

    #[error("invalid geocoding response: {message}")]
    InvalidResponse { message: String },
}

pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// Failure to construct a [`NominatimGeocoder`](crate::NominatimGeocoder).
#[derive(Debug, Error)]
pub enum NominatimBuildError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
