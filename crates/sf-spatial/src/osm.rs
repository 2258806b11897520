//! OSM PBF graph construction, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use sf_core::NetworkType;
//! use sf_spatial::osm::PbfGraphSource;
//! use sf_spatial::StreetGraphRepository;
//!
//! let repo = StreetGraphRepository::new(PbfGraphSource::new("extracts"), NetworkType::Walk)
//!     .with_cache_dir("cache");
//! let graph = repo.load("Lviv, Ukraine")?; // reads extracts/lviv-ukraine.osm.pbf
//! ```
//!
//! # What is loaded
//!
//! Only `highway=*` ways routable for the requested [`NetworkType`]:
//!
//! | Network | Kept ways                                    | Direction            |
//! |---------|----------------------------------------------|----------------------|
//! | `Drive` | car-drivable classes, no `access=no/private` | `oneway` honoured    |
//! | `Walk`  | everything except motorways/trunks, `foot=no`| always both ways     |
//!
//! Edge weight is the geodesic length of each way segment in metres.

use std::path::{Path, PathBuf};

use osmpbf::{Element, ElementReader};
use rustc_hash::{FxHashMap, FxHashSet};

use sf_core::{GeoPoint, NetworkType, NodeId};

use crate::network::StreetGraphBuilder;
use crate::repository::{area_slug, GraphSource};
use crate::{SpatialError, SpatialResult};

// ── GraphSource over a directory of extracts ──────────────────────────────────

/// Resolves an area name to `<dir>/<slug>.osm.pbf` and loads it.
#[derive(Clone, Debug)]
pub struct PbfGraphSource {
    extract_dir: PathBuf,
}

impl PbfGraphSource {
    pub fn new(extract_dir: impl Into<PathBuf>) -> Self {
        Self { extract_dir: extract_dir.into() }
    }

    /// Extract file for `area`; `None` if the name has no usable characters.
    pub fn extract_path(&self, area: &str) -> Option<PathBuf> {
        area_slug(area).map(|slug| self.extract_dir.join(format!("{slug}.osm.pbf")))
    }
}

impl GraphSource for PbfGraphSource {
    fn build(&self, area: &str, network: NetworkType) -> SpatialResult<StreetGraphBuilder> {
        match self.extract_path(area) {
            Some(path) if path.is_file() => load_from_pbf(&path, network),
            _ => Err(SpatialError::PlaceNotFound { area: area.to_owned() }),
        }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Read the routable ways of a PBF extract into an unsimplified builder.
///
/// # Errors
///
/// Returns [`SpatialError::Osm`] on parse errors.
pub fn load_from_pbf(path: &Path, network: NetworkType) -> SpatialResult<StreetGraphBuilder> {
    // ── Phase 1: collect all OSM nodes + routable ways in one pass ────────
    let reader = ElementReader::from_path(path).map_err(|e| SpatialError::Osm(e.to_string()))?;

    let mut all_nodes: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                let tags: Vec<(&str, &str)> = w.tags().collect();
                if let Some(direction) = way_direction(network, &tags) {
                    ways.push(OsmWay { refs: w.refs().collect(), direction });
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    // ── Phase 2: add only way-referenced nodes ────────────────────────────
    let used: FxHashSet<i64> = ways.iter().flat_map(|w| w.refs.iter().copied()).collect();
    let mut osm_ids: Vec<i64> = used.into_iter().filter(|id| all_nodes.contains_key(id)).collect();
    // Sorted so NodeIds do not depend on hash iteration order.
    osm_ids.sort_unstable();

    let mut builder = StreetGraphBuilder::with_capacity(osm_ids.len(), osm_ids.len() * 2);
    let mut to_node: FxHashMap<i64, NodeId> = FxHashMap::default();
    for osm_id in osm_ids {
        if let Some(&pos) = all_nodes.get(&osm_id) {
            to_node.insert(osm_id, builder.add_node(pos));
        }
    }
    drop(all_nodes);

    // ── Phase 3: directed edges along each way ────────────────────────────
    for way in &ways {
        for pair in way.refs.windows(2) {
            let (Some(&a), Some(&b)) = (to_node.get(&pair[0]), to_node.get(&pair[1])) else {
                continue;
            };
            if a == b {
                continue;
            }
            let (Some(pa), Some(pb)) = (builder.node_pos(a), builder.node_pos(b)) else {
                continue;
            };
            let len_m = pa.distance_m(pb);
            match way.direction {
                Direction::Both     => builder.add_street(a, b, len_m),
                Direction::Forward  => builder.add_directed_edge(a, b, len_m),
                Direction::Backward => builder.add_directed_edge(b, a, len_m),
            }
        }
    }

    log::info!(
        "read {} {} ways from {}: {} nodes, {} directed edges",
        ways.len(),
        network,
        path.display(),
        builder.node_count(),
        builder.edge_count()
    );
    Ok(builder)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    refs:      Vec<i64>,
    direction: Direction,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Both,
    Forward,
    Backward,
}

// ── Tag helpers ───────────────────────────────────────────────────────────────

fn tag<'a>(tags: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Traversal direction of a way for `network`, or `None` if it is not
/// routable at all.
pub(crate) fn way_direction(network: NetworkType, tags: &[(&str, &str)]) -> Option<Direction> {
    let highway = tag(tags, "highway")?;
    if matches!(highway, "construction" | "proposed" | "abandoned" | "raceway" | "bus_guideway") {
        return None;
    }
    if matches!(tag(tags, "area"), Some("yes")) {
        return None;
    }
    let routable = match network {
        NetworkType::Walk => walkable(highway, tags),
        NetworkType::Drive => drivable(highway, tags),
    };
    if !routable {
        return None;
    }
    Some(if network.honours_oneway() { oneway(highway, tags) } else { Direction::Both })
}

fn walkable(highway: &str, tags: &[(&str, &str)]) -> bool {
    if matches!(highway, "motorway" | "motorway_link" | "trunk" | "trunk_link") {
        return false;
    }
    match tag(tags, "foot") {
        Some("no") => false,
        Some("yes" | "designated" | "permissive") => true,
        _ => !matches!(tag(tags, "access"), Some("no" | "private")),
    }
}

fn drivable(highway: &str, tags: &[(&str, &str)]) -> bool {
    let car_class = !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track"
            | "bridleway" | "corridor" | "elevator" | "platform"
    );
    car_class
        && !matches!(tag(tags, "access"), Some("no" | "private"))
        && !matches!(tag(tags, "motor_vehicle"), Some("no"))
}

/// Motorways and roundabouts are implicitly one-way in OSM convention.
fn oneway(highway: &str, tags: &[(&str, &str)]) -> Direction {
    match tag(tags, "oneway") {
        Some("yes" | "1" | "true") => Direction::Forward,
        Some("-1" | "reverse") => Direction::Backward,
        Some("no" | "false" | "0") => Direction::Both,
        _ if matches!(highway, "motorway" | "motorway_link")
            || matches!(tag(tags, "junction"), Some("roundabout")) =>
        {
            Direction::Forward
        }
        _ => Direction::Both,
    }
}
