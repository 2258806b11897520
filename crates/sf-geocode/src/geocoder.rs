//! The external geocoding capability.

use std::time::Duration;

use sf_core::GeoPoint;

use crate::GeocodeResult;

/// Looks up the coordinate of a fully qualified address string.
///
/// Implementations must be `Send + Sync`: one geocoder serves every
/// concurrent route request.  `timeout` is an upper bound on the whole
/// lookup; an implementation that cannot finish in time returns
/// [`GeocodeError::TimedOut`](crate::GeocodeError::TimedOut).
///
/// `Ok(None)` means the service answered and found nothing.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str, timeout: Duration) -> GeocodeResult<Option<GeoPoint>>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn geocode(&self, query: &str, timeout: Duration) -> GeocodeResult<Option<GeoPoint>> {
        (**self).geocode(query, timeout)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn geocode(&self, query: &str, timeout: Duration) -> GeocodeResult<Option<GeoPoint>> {
        (**self).geocode(query, timeout)
    }
}
