//! Nearest-node spatial index.
//!
//! Nodes are projected onto a local equirectangular plane
//! (`x = lon · cos φ₀`, `y = lat`, φ₀ = mean node latitude) and bulk-loaded
//! into an R-tree.  At city scale the projected distance ranks nodes the same
//! way the geodesic distance does, while staying cheap to compute.
//!
//! Lookups are deterministic: among nodes at exactly the same projected
//! distance the lowest `NodeId` wins.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use sf_core::{GeoPoint, NodeId};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct IndexEntry {
    point: [f64; 2], // [x, y] projected
    id:    NodeId,
}

impl RTreeObject for IndexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NearestNodeIndex ──────────────────────────────────────────────────────────

/// Read-only nearest-node lookup for one graph's node set.
///
/// Built once per graph (see [`StreetGraph::nearest_index`]) and shared
/// between concurrent requests.
///
/// [`StreetGraph::nearest_index`]: crate::StreetGraph::nearest_index
pub struct NearestNodeIndex {
    tree:    RTree<IndexEntry>,
    cos_lat: f64,
}

impl NearestNodeIndex {
    /// Bulk-load an index over `positions`; entry `i` becomes `NodeId(i)`.
    pub fn new(positions: &[GeoPoint]) -> Self {
        let cos_lat = if positions.is_empty() {
            1.0
        } else {
            let mean_lat = positions.iter().map(|p| p.lat).sum::<f64>() / positions.len() as f64;
            mean_lat.to_radians().cos()
        };

        let entries: Vec<IndexEntry> = positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| IndexEntry {
                point: project(pos, cos_lat),
                id:    NodeId(i as u32),
            })
            .collect();

        Self { tree: RTree::bulk_load(entries), cos_lat }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest node to `pos`; ties go to the lowest `NodeId`.
    ///
    /// Returns `None` only if the index is empty.
    pub fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        let query = project(pos, self.cos_lat);
        let mut hits = self.tree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_d2) = hits.next()?;
        let mut best = first.id;
        for (entry, d2) in hits {
            if d2 > best_d2 {
                break;
            }
            best = best.min(entry.id);
        }
        Some(best)
    }

    /// Up to `k` nodes sorted by ascending projected distance.
    pub fn k_nearest(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        let query = project(pos, self.cos_lat);
        self.tree
            .nearest_neighbor_iter(&query)
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

#[inline]
fn project(pos: GeoPoint, cos_lat: f64) -> [f64; 2] {
    [pos.lon * cos_lat, pos.lat]
}
