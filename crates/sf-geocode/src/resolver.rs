//! Address qualification and resolution.
//!
//! Users type a street address without the city.  Before geocoding, the
//! configured city qualifier (`"Львів, Україна"` by default) is appended so
//! the lookup is confined to the right place:
//!
//! | Input                         | Query sent to the geocoder              |
//! |-------------------------------|-----------------------------------------|
//! | `Городоцька 5`                | `Городоцька 5, Львів, Україна`          |
//! | `Городоцька 5, Львів`         | `Городоцька 5, Львів, Україна`          |
//! | `городоцька 5, ЛЬВІВ, Україна`| unchanged                               |

use std::time::Duration;

use sf_core::{GeoPoint, RouteConfig};

use crate::{GeocodeError, GeocodeResult, Geocoder};

/// Append each comma-separated component of `qualifier` that is not already
/// a whole component of `address` (trimmed, case-insensitive).
///
/// Matching is per component, so a street named after the city
/// (`Львівська 5`) still gets the city appended.
pub fn qualify_address(address: &str, qualifier: &str) -> String {
    let mut query = address.trim().trim_end_matches(',').trim_end().to_owned();
    let present: Vec<String> = query.split(',').map(|c| c.trim().to_lowercase()).collect();
    for part in qualifier.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if present.contains(&part.to_lowercase()) {
            continue;
        }
        if !query.is_empty() {
            query.push_str(", ");
        }
        query.push_str(part);
    }
    query
}

/// Resolves free-text addresses through a [`Geocoder`].
#[derive(Debug)]
pub struct AddressResolver<G> {
    geocoder:       G,
    city_qualifier: String,
    timeout:        Duration,
}

impl<G: Geocoder> AddressResolver<G> {
    /// Resolver with the default qualifier and timeout.
    pub fn new(geocoder: G) -> Self {
        Self::from_config(geocoder, &RouteConfig::default())
    }

    pub fn from_config(geocoder: G, config: &RouteConfig) -> Self {
        Self {
            geocoder,
            city_qualifier: config.city_qualifier.clone(),
            timeout:        config.geocode_timeout(),
        }
    }

    pub fn with_city_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.city_qualifier = qualifier.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// The query actually sent for `address`.
    pub fn qualify(&self, address: &str) -> String {
        qualify_address(address, &self.city_qualifier)
    }

    /// Coordinate of `address`.
    ///
    /// `deadline`, if given, caps the configured timeout.  A blank address
    /// is reported as not found without calling the geocoder.  Failures are
    /// returned as-is; nothing is retried.
    pub fn resolve(&self, address: &str, deadline: Option<Duration>) -> GeocodeResult<GeoPoint> {
        if address.trim().is_empty() {
            return Err(GeocodeError::NotFound { query: address.to_owned() });
        }

        let query = self.qualify(address);
        let timeout = deadline.map_or(self.timeout, |d| d.min(self.timeout));
        match self.geocoder.geocode(&query, timeout) {
            Ok(Some(point)) => {
                log::debug!("resolved {query:?} to {point}");
                Ok(point)
            }
            Ok(None) => {
                log::info!("no geocoding match for {query:?}");
                Err(GeocodeError::NotFound { query })
            }
            Err(e) => {
                log::warn!("geocoding {query:?} failed: {e}");
                Err(e)
            }
        }
    }
}
