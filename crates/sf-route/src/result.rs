//! Route output.

use serde::{Deserialize, Serialize};

use sf_core::GeoPoint;

/// How a [`PathResult`] was obtained.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Shortest path over the street graph.
    #[default]
    Network,
    /// Two-point line to the nearest candidate; the destination is very
    /// close or not reachable over the graph.
    StraightLine,
}

/// A finished route to one destination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Name of the chosen destination.
    pub name:        String,
    /// Polyline from the start to the destination, at least two points.
    pub coordinates: Vec<GeoPoint>,
    pub distance_m:  f64,
    /// Estimated travel time, one decimal.
    pub minutes:     f64,
    pub kind:        RouteKind,
}

impl PathResult {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1_000.0
    }

    pub fn start(&self) -> Option<GeoPoint> {
        self.coordinates.first().copied()
    }

    pub fn end(&self) -> Option<GeoPoint> {
        self.coordinates.last().copied()
    }
}
