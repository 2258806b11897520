//! [`Geocoder`] backed by the Nominatim search API.
//!
//! One request per lookup:
//!
//! ```text
//! GET {base_url}/search?q={query}&format=jsonv2&limit=1
//! ```
//!
//! The response is a JSON array of places whose `lat`/`lon` are decimal
//! strings.  An empty array is "no match".
//!
//! # Runtime behaviour
//!
//! [`Geocoder`] is synchronous.  The geocoder owns a small multi-threaded
//! Tokio runtime and blocks on it.  Inside a caller's runtime:
//!
//! | Caller runtime   | Lookup runs                                         |
//! |------------------|-----------------------------------------------------|
//! | none             | `block_on` the owned runtime                        |
//! | multi-threaded   | caller's runtime, through `block_in_place`          |
//! | current-thread   | owned runtime, on a scoped helper thread            |
//!
//! The owned runtime is shut down in the background on drop, so dropping a
//! geocoder inside an async context is safe.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use sf_core::GeoPoint;

use crate::{GeocodeError, GeocodeResult, Geocoder, NominatimBuildError};

/// Public Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim's usage policy requires an identifying user agent.
pub const DEFAULT_USER_AGENT: &str = "shelter_finder/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct NominatimConfig {
    pub base_url:   String,
    pub user_agent: String,
    /// Upper bound on a request; a shorter per-call timeout wins.
    pub timeout:    Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url:   DEFAULT_BASE_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout:    Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl NominatimConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

// ── Response ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// Decode a `format=jsonv2` search body into the first place's coordinate.
pub(crate) fn parse_search_response(body: &str) -> GeocodeResult<Option<GeoPoint>> {
    let places: Vec<Place> = serde_json::from_str(body).map_err(|e| {
        GeocodeError::InvalidResponse { message: e.to_string() }
    })?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let parse = |field: &str, value: &str| {
        value.trim().parse::<f64>().map_err(|_| GeocodeError::InvalidResponse {
            message: format!("{field} is not a number: {value:?}"),
        })
    };
    let point = GeoPoint::new(parse("lat", &place.lat)?, parse("lon", &place.lon)?);
    if !point.is_valid() {
        return Err(GeocodeError::InvalidResponse {
            message: format!("coordinate out of range: {point}"),
        });
    }
    Ok(Some(point))
}

// ── NominatimGeocoder ─────────────────────────────────────────────────────────

pub struct NominatimGeocoder {
    client:  Client,
    config:  NominatimConfig,
    /// Always `Some` until drop.
    runtime: Option<Runtime>,
}

impl std::fmt::Debug for NominatimGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimGeocoder")
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl NominatimGeocoder {
    /// Geocoder against `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self, NominatimBuildError> {
        Self::with_config(NominatimConfig::new(base_url))
    }

    pub fn with_config(config: NominatimConfig) -> Result<Self, NominatimBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(NominatimBuildError::HttpClient)?;
        // Two workers so concurrent callers blocking on the runtime do not
        // queue behind each other's I/O.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("sf-geocode")
            .enable_all()
            .build()
            .map_err(NominatimBuildError::Runtime)?;
        Ok(Self { client, config, runtime: Some(runtime) })
    }

    pub fn config(&self) -> &NominatimConfig {
        &self.config
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }

    pub(crate) fn request(&self, query: &str, timeout: Duration) -> reqwest::RequestBuilder {
        self.client
            .get(self.search_url())
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .timeout(timeout)
    }

    async fn geocode_async(&self, query: &str, timeout: Duration) -> GeocodeResult<Option<GeoPoint>> {
        let url = self.search_url();
        let response = self
            .request(query, timeout)
            .send()
            .await
            .map_err(|e| convert_reqwest_error(&e, &url, timeout))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::Throttled);
        }
        if !status.is_success() {
            return Err(GeocodeError::Http {
                status:  status.as_u16(),
                message: status.canonical_reason().unwrap_or_default().to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| convert_reqwest_error(&e, &url, timeout))?;
        parse_search_response(&body)
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, query: &str, timeout: Duration) -> GeocodeResult<Option<GeoPoint>> {
        let timeout = timeout.min(self.config.timeout);
        if timeout.is_zero() {
            return Err(GeocodeError::TimedOut { timeout_ms: 0 });
        }
        log::debug!("nominatim lookup {query:?} (timeout {} ms)", timeout.as_millis());

        let future = self.geocode_async(query, timeout);
        let runtime = self.runtime.as_ref().ok_or_else(|| GeocodeError::Network {
            url:     self.search_url(),
            message: "geocoder runtime has shut down".to_owned(),
        })?;
        match Handle::try_current().map(|h| (h.runtime_flavor(), h)) {
            Ok((RuntimeFlavor::MultiThread, handle)) => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // A current-thread runtime cannot block in place, and `block_on`
            // panics on a thread that is already driving a runtime.
            Ok(_) => std::thread::scope(|scope| {
                scope.spawn(|| runtime.block_on(future)).join().unwrap_or_else(|_| {
                    Err(GeocodeError::Network {
                        url:     self.search_url(),
                        message: "geocoder worker panicked".to_owned(),
                    })
                })
            }),
            Err(_) => runtime.block_on(future),
        }
    }
}

impl Drop for NominatimGeocoder {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn convert_reqwest_error(error: &reqwest::Error, url: &str, timeout: Duration) -> GeocodeError {
    if error.is_timeout() {
        return GeocodeError::TimedOut { timeout_ms: timeout.as_millis() };
    }
    if let Some(status) = error.status() {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return GeocodeError::Throttled;
        }
        return GeocodeError::Http { status: status.as_u16(), message: error.to_string() };
    }
    if error.is_decode() {
        return GeocodeError::InvalidResponse { message: error.to_string() };
    }
    GeocodeError::Network { url: url.to_owned(), message: error.to_string() }
}
