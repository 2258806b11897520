//! Radius filtering.

use sf_core::{GeoPoint, RadiusBand};

use crate::{CatalogResult, Destination, DestinationSource};

/// Destinations whose geodesic distance from `user` lies inside `band`
/// (both bounds inclusive), in source order.
///
/// An empty result is a valid outcome; the caller decides what it means.
pub fn candidates_near(
    source: &dyn DestinationSource,
    user: GeoPoint,
    band: RadiusBand,
) -> CatalogResult<Vec<Destination>> {
    let mut candidates = Vec::new();
    let stats = source.scan(&mut |d: Destination| {
        if band.contains(user.distance_km(d.point)) {
            candidates.push(d);
        }
    })?;

    log::debug!(
        "{} of {} destinations within {}..={} km of {user} ({} rows skipped)",
        candidates.len(),
        stats.yielded,
        band.min_km,
        band.max_km,
        stats.skipped
    );
    Ok(candidates)
}
