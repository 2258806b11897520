//! Deterministic [`Geocoder`] double.
//!
//! [`StaticGeocoder`] answers from a fixed table without network access and
//! records every query it receives, so tests can check both what was asked
//! and whether the geocoder was reached at all.
//!
//! ```
//! use std::time::Duration;
//! use sf_core::GeoPoint;
//! use sf_geocode::{Geocoder, test_support::StaticGeocoder};
//!
//! let geocoder = StaticGeocoder::new()
//!     .with_match("Городоцька 5, Львів, Україна", GeoPoint::new(49.838, 24.012));
//! let hit = geocoder.geocode("Городоцька 5, Львів, Україна", Duration::from_secs(1));
//! assert_eq!(hit, Ok(Some(GeoPoint::new(49.838, 24.012))));
//! assert_eq!(geocoder.calls(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use sf_core::GeoPoint;

use crate::{GeocodeError, GeocodeResult, Geocoder};

#[derive(Debug, Default)]
pub struct StaticGeocoder {
    matches:  HashMap<String, GeoPoint>,
    fallback: Option<GeoPoint>,
    error:    Option<GeocodeError>,
    log:      Mutex<Vec<(String, Duration)>>,
}

impl StaticGeocoder {
    /// A geocoder that matches nothing until entries are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every query with `point`.
    pub fn always(point: GeoPoint) -> Self {
        Self { fallback: Some(point), ..Self::default() }
    }

    /// Fail every query with `error`.
    pub fn failing(error: GeocodeError) -> Self {
        Self { error: Some(error), ..Self::default() }
    }

    /// Answer the exact query string `query` with `point`.
    #[must_use]
    pub fn with_match(mut self, query: impl Into<String>, point: GeoPoint) -> Self {
        self.matches.insert(query.into(), point);
        self
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.iter().map(|(q, _)| q.clone()).collect()
    }

    /// Timeout passed with the most recent lookup.
    pub fn last_timeout(&self) -> Option<Duration> {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.last().map(|&(_, t)| t)
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, query: &str, timeout: Duration) -> GeocodeResult<Option<GeoPoint>> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((query.to_owned(), timeout));

        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self.matches.get(query).copied().or(self.fallback))
    }
}
