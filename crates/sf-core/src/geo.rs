//! Geographic coordinate type and distance helpers.
//!
//! `GeoPoint` is `f64` so the geodesic distances reported to callers match
//! the fallback-route distance exactly (no single-precision rounding between
//! the catalog filter and the assembler).

use std::fmt;

use ::geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};

/// A WGS-84 coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when both components are finite and inside the WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Geodesic distance on the WGS-84 ellipsoid, in metres.
    ///
    /// Uses Karney's algorithm via `geo`; accurate to well under a millimetre.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        Geodesic.distance(self.to_point(), other.to_point())
    }

    /// [`distance_m`](Self::distance_m) expressed in kilometres.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        self.distance_m(other) / 1_000.0
    }

    /// `geo` point (x = lon, y = lat).
    #[inline]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<(f64, f64)> for GeoPoint {
    /// Interprets the tuple as `(lat, lon)`.
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
