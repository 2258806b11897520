//! The end-to-end route pipeline.
//!
//! [`RoutePlanner::compute_route`] runs these stages in order and stops at
//! the first failure:
//!
//! | Stage | Work                                      | Failure                     |
//! |-------|-------------------------------------------|-----------------------------|
//! | 1     | resolve the address                       | `AddressNotFound`           |
//! | 2     | filter destinations by radius             | `NoCandidateDestinations`   |
//! | 3     | load the area's street graph              | `GraphLoadFailure`          |
//! | 4     | snap the start point and each candidate   | dropped candidate / fallback|
//! | 5     | one shortest-path search from the start   | `Search`                    |
//! | 6     | pick, rebuild, and check the route        | fallback, or fatal          |
//!
//! No graph is loaded for a request that has no candidates.
//!
//! A planner is `Send + Sync` whenever its geocoder, graph source, and
//! engine are: one instance serves concurrent requests, sharing the graph
//! and its nearest-node index.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;

use sf_catalog::{candidates_near, Destination, DestinationSource};
use sf_core::{CoreResult, GeoPoint, NodeId, RouteConfig};
use sf_geocode::{AddressResolver, Geocoder};
use sf_spatial::{DijkstraEngine, GraphSource, ShortestPathEngine, StreetGraph, StreetGraphRepository};

use crate::assembler::{Candidate, RouteAssembler};
use crate::{PathResult, RouteError, RouteResult};

pub struct RoutePlanner<G, S, E = DijkstraEngine>
where
    G: Geocoder,
    S: GraphSource,
    E: ShortestPathEngine,
{
    resolver:  AddressResolver<G>,
    graphs:    StreetGraphRepository<S>,
    engine:    E,
    assembler: RouteAssembler,
    config:    RouteConfig,
}

impl<G: Geocoder, S: GraphSource> RoutePlanner<G, S> {
    /// Planner for `config`, searching with [`DijkstraEngine`].
    ///
    /// Graphs are built from `source` for `config.network_type` and kept in
    /// memory only; see [`with_cache_dir`](Self::with_cache_dir).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`](sf_core::CoreError::InvalidConfig)
    /// if `config` fails [`RouteConfig::validate`].
    pub fn new(geocoder: G, source: S, config: RouteConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            resolver:  AddressResolver::from_config(geocoder, &config),
            graphs:    StreetGraphRepository::new(source, config.network_type),
            engine:    DijkstraEngine,
            assembler: RouteAssembler::from_config(&config),
            config,
        })
    }
}

impl<G, S, E> RoutePlanner<G, S, E>
where
    G: Geocoder,
    S: GraphSource,
    E: ShortestPathEngine,
{
    /// Swap the shortest-path search.
    pub fn with_engine<E2: ShortestPathEngine>(self, engine: E2) -> RoutePlanner<G, S, E2> {
        RoutePlanner {
            resolver:  self.resolver,
            graphs:    self.graphs,
            engine,
            assembler: self.assembler,
            config:    self.config,
        }
    }

    /// Persist built graphs under `dir`.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.graphs = self.graphs.with_cache_dir(dir);
        self
    }

    /// Toggle degree-2 simplification of freshly built graphs.
    pub fn with_simplification(mut self, enabled: bool) -> Self {
        self.graphs = self.graphs.with_simplification(enabled);
        self
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AddressResolver<G> {
        &self.resolver
    }

    pub fn graphs(&self) -> &StreetGraphRepository<S> {
        &self.graphs
    }

    /// Load the configured area's graph ahead of the first request.
    pub fn warm_up(&self) -> RouteResult<Arc<StreetGraph>> {
        self.load_graph()
    }

    /// Route from `address` to the nearest destination in `destinations`.
    pub fn compute_route(
        &self,
        address: &str,
        destinations: &dyn DestinationSource,
    ) -> RouteResult<PathResult> {
        self.compute_route_with_deadline(address, destinations, None)
    }

    /// [`compute_route`](Self::compute_route) with a caller deadline that
    /// caps the geocoding timeout.
    pub fn compute_route_with_deadline(
        &self,
        address: &str,
        destinations: &dyn DestinationSource,
        deadline: Option<Duration>,
    ) -> RouteResult<PathResult> {
        // ── 1. Address ────────────────────────────────────────────────────
        let start = self.resolver.resolve(address, deadline).map_err(|source| {
            RouteError::AddressNotFound { address: address.to_owned(), source }
        })?;

        // ── 2. Candidates ─────────────────────────────────────────────────
        let band = self.config.radius_band();
        let candidates = candidates_near(destinations, start, band)?;
        if candidates.is_empty() {
            return Err(RouteError::NoCandidateDestinations {
                min_km: band.min_km,
                max_km: band.max_km,
            });
        }

        // ── 3. Graph ──────────────────────────────────────────────────────
        let graph = self.load_graph()?;

        // ── 4. Snapping ───────────────────────────────────────────────────
        let Some(start_node) = self.snap(&graph, start) else {
            log::info!("start point {start} has no street node nearby; using straight-line fallback");
            return self.fallback(start, &candidates);
        };
        let snapped: Vec<Candidate> = candidates
            .par_iter()
            .filter_map(|d| match self.snap(&graph, d.point) {
                Some(node) => Some(Candidate { destination: d.clone(), node }),
                None => {
                    log::warn!("dropping destination {:?}: no street node near {}", d.name, d.point);
                    None
                }
            })
            .collect();

        // ── 5. Search ─────────────────────────────────────────────────────
        let tree = self
            .engine
            .shortest_paths(&graph, start_node)
            .map_err(RouteError::Search)?;

        // ── 6. Assembly ───────────────────────────────────────────────────
        let result = self.assembler.assemble(&graph, &tree, &snapped, start, &candidates)?;
        log::info!(
            "route to {:?}: {:.0} m, {} min ({:?})",
            result.name,
            result.distance_m,
            result.minutes,
            result.kind
        );
        Ok(result)
    }

    fn load_graph(&self) -> RouteResult<Arc<StreetGraph>> {
        let area = &self.config.area;
        self.graphs.load(area).map_err(|source| RouteError::GraphLoadFailure {
            area: area.clone(),
            source,
        })
    }

    /// Nearest node to `point`, unless it is farther than the configured
    /// snap limit.
    fn snap(&self, graph: &StreetGraph, point: GeoPoint) -> Option<NodeId> {
        let node = graph.snap_to_node(point)?;
        match self.config.max_snap_distance_m {
            Some(limit) => {
                let pos = graph.position(node)?;
                (pos.distance_m(point) <= limit).then_some(node)
            }
            None => Some(node),
        }
    }

    fn fallback(&self, start: GeoPoint, candidates: &[Destination]) -> RouteResult<PathResult> {
        self.assembler
            .straight_line(start, candidates)
            .ok_or(RouteError::NoReachableDestination)
    }
}
