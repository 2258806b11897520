//! Turning a shortest-path tree into a [`PathResult`].
//!
//! # Selection
//!
//! Among candidates with a finite distance, the smallest distance wins; on
//! equal distances the earlier candidate wins.  The path is rebuilt from the
//! predecessor chain, and its edge weights are summed again and checked
//! against the search's distance.
//!
//! # Fallback
//!
//! If no candidate is reachable, or the winning path has fewer than two
//! points, the result is a straight line from the start point to the
//! geodesically nearest of all candidates.

use sf_catalog::Destination;
use sf_core::{GeoPoint, NodeId, RouteConfig};
use sf_spatial::{ShortestPathTree, StreetGraph};

use crate::{PathResult, RouteError, RouteKind, RouteResult};

/// Relative tolerance for the edge-sum vs. search-distance check.
const DISTANCE_EPSILON: f64 = 1e-9;

/// A candidate destination and the graph node it snapped to.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub destination: Destination,
    pub node:        NodeId,
}

/// `distance_m` at `speed_kmh`, in minutes rounded to one decimal.
pub fn estimate_minutes(distance_m: f64, speed_kmh: f64) -> f64 {
    let minutes = distance_m / 1_000.0 / speed_kmh * 60.0;
    (minutes * 10.0).round() / 10.0
}

#[derive(Copy, Clone, Debug)]
pub struct RouteAssembler {
    speed_kmh: f64,
}

impl RouteAssembler {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    pub fn from_config(config: &RouteConfig) -> Self {
        Self::new(config.assumed_speed_kmh)
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn estimate_minutes(&self, distance_m: f64) -> f64 {
        estimate_minutes(distance_m, self.speed_kmh)
    }

    /// Graph route to the nearest reachable candidate, falling back to a
    /// straight line from `start` to the nearest of `all` when there is none.
    ///
    /// Fatal routing failures are returned unchanged.
    pub fn assemble(
        &self,
        graph: &StreetGraph,
        tree: &ShortestPathTree,
        snapped: &[Candidate],
        start: GeoPoint,
        all: &[Destination],
    ) -> RouteResult<PathResult> {
        match self.graph_route(graph, tree, snapped) {
            Err(e) if e.is_fallback_trigger() => {
                log::info!("{e}; using straight-line fallback");
                self.straight_line(start, all).ok_or(e)
            }
            other => other,
        }
    }

    /// Shortest network route to the nearest reachable candidate.
    ///
    /// # Errors
    ///
    /// [`RouteError::NoReachableDestination`] and
    /// [`RouteError::DegeneratePath`] ask for the fallback; the others are
    /// fatal.
    pub fn graph_route(
        &self,
        graph: &StreetGraph,
        tree: &ShortestPathTree,
        snapped: &[Candidate],
    ) -> RouteResult<PathResult> {
        let mut best: Option<(&Candidate, f64)> = None;
        for c in snapped {
            let d = tree.distance(c.node);
            if d.is_finite() && best.is_none_or(|(_, b)| d < b) {
                best = Some((c, d));
            }
        }
        let Some((chosen, reported_m)) = best else {
            return Err(RouteError::NoReachableDestination);
        };

        let node = chosen.node;
        let path = tree.path_to(node).ok_or(RouteError::BrokenPath { node })?;
        if path.len() < 2 {
            return Err(RouteError::DegeneratePath { node });
        }

        let mut edge_sum_m = 0.0;
        for pair in path.windows(2) {
            edge_sum_m += graph
                .edge_weight(pair[0], pair[1])
                .ok_or(RouteError::BrokenPath { node })?;
        }
        if (edge_sum_m - reported_m).abs() > DISTANCE_EPSILON * reported_m.max(1.0) {
            return Err(RouteError::InconsistentPath { node, edge_sum_m, reported_m });
        }

        let coordinates = path
            .iter()
            .map(|&n| graph.position(n))
            .collect::<Option<Vec<GeoPoint>>>()
            .ok_or(RouteError::BrokenPath { node })?;

        Ok(PathResult {
            name: chosen.destination.name.clone(),
            coordinates,
            distance_m: reported_m,
            minutes: self.estimate_minutes(reported_m),
            kind: RouteKind::Network,
        })
    }

    /// Two-point route to the destination geodesically nearest to `start`
    /// (first one on ties).  `None` only if `all` is empty.
    pub fn straight_line(&self, start: GeoPoint, all: &[Destination]) -> Option<PathResult> {
        let mut best: Option<(&Destination, f64)> = None;
        for d in all {
            let dist = start.distance_m(d.point);
            if best.is_none_or(|(_, b)| dist < b) {
                best = Some((d, dist));
            }
        }
        let (dest, distance_m) = best?;
        Some(PathResult {
            name: dest.name.clone(),
            coordinates: vec![start, dest.point],
            distance_m,
            minutes: self.estimate_minutes(distance_m),
            kind: RouteKind::StraightLine,
        })
    }
}
