//! Street graph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Within one row the targets are strictly increasing, so there is at most
//! one edge per ordered `(from, to)` pair and `edge_between` is a binary
//! search.  Parallel input edges are collapsed to their minimum weight by
//! [`StreetGraphBuilder::build`].
//!
//! # Invariants
//!
//! A `StreetGraph` can only be obtained from [`StreetGraphBuilder::build`] or
//! [`StreetGraph::from_parts`], both of which reject dangling endpoints and
//! negative or non-finite weights.  Shortest-path code relies on this.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use sf_core::{EdgeId, GeoPoint, NodeId};

use crate::index::NearestNodeIndex;
use crate::{SpatialError, SpatialResult};

// ── StreetGraph ───────────────────────────────────────────────────────────────

/// Immutable directed street graph in CSR format.
///
/// Shared read-only between concurrent route computations (wrap in `Arc`).
/// The nearest-node index is built on first use and reused afterwards.
///
/// The CSR arrays are read through accessors only; a built graph cannot be
/// edited into one that breaks the invariants above:
///
/// ```compile_fail
/// use sf_spatial::StreetGraphBuilder;
///
/// let mut g = StreetGraphBuilder::new().build().unwrap();
/// g.edge_length_m.push(-50.0);
/// ```
pub struct StreetGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub(crate) node_pos: Vec<GeoPoint>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub(crate) node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    /// Source node of each edge.  Redundant with CSR, kept for path walks.
    pub(crate) edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub(crate) edge_to: Vec<NodeId>,

    /// Length of each edge in metres.  Also the shortest-path weight.
    pub(crate) edge_length_m: Vec<f64>,

    // ── Spatial index ─────────────────────────────────────────────────────
    index: OnceLock<NearestNodeIndex>,
}

/// Serializable CSR arrays of a [`StreetGraph`], used by the graph cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphParts {
    pub node_pos:       Vec<GeoPoint>,
    pub node_out_start: Vec<u32>,
    pub edge_to:        Vec<NodeId>,
    pub edge_length_m:  Vec<f64>,
}

impl StreetGraph {
    /// A graph with no nodes or edges.  Every node lookup against it fails.
    pub fn empty() -> Self {
        Self {
            node_pos:       Vec::new(),
            node_out_start: vec![0],
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_length_m:  Vec::new(),
            index:          OnceLock::new(),
        }
    }

    /// Rebuild a graph from raw CSR arrays, checking every invariant.
    pub fn from_parts(parts: GraphParts) -> SpatialResult<Self> {
        let GraphParts { node_pos, node_out_start, edge_to, edge_length_m } = parts;
        let node_count = node_pos.len();
        let edge_count = edge_to.len();

        if edge_length_m.len() != edge_count {
            return Err(SpatialError::Layout(format!(
                "{} edge targets but {} edge weights",
                edge_count,
                edge_length_m.len()
            )));
        }
        if node_out_start.len() != node_count + 1 {
            return Err(SpatialError::Layout(format!(
                "row pointer has {} entries, expected {}",
                node_out_start.len(),
                node_count + 1
            )));
        }
        if node_out_start.first() != Some(&0)
            || node_out_start.last().map(|&n| n as usize) != Some(edge_count)
            || node_out_start.windows(2).any(|w| w[0] > w[1])
        {
            return Err(SpatialError::Layout(
                "row pointer is not a non-decreasing 0..=edge_count sequence".to_owned(),
            ));
        }

        let mut edge_from = Vec::with_capacity(edge_count);
        for (n, row) in node_out_start.windows(2).enumerate() {
            let from = NodeId(n as u32);
            let (start, end) = (row[0] as usize, row[1] as usize);
            let mut prev: Option<NodeId> = None;
            for i in start..end {
                let to = edge_to[i];
                if to.index() >= node_count {
                    return Err(SpatialError::DanglingEdge { from, to, node_count });
                }
                check_weight(from, to, edge_length_m[i])?;
                if prev.is_some_and(|p| p >= to) {
                    return Err(SpatialError::Layout(format!(
                        "row {from} has unsorted or parallel edges"
                    )));
                }
                prev = Some(to);
                edge_from.push(from);
            }
        }

        Ok(Self {
            node_pos,
            node_out_start,
            edge_from,
            edge_to,
            edge_length_m,
            index: OnceLock::new(),
        })
    }

    /// Copy the CSR arrays out for serialization.
    pub fn to_parts(&self) -> GraphParts {
        GraphParts {
            node_pos:       self.node_pos.clone(),
            node_out_start: self.node_out_start.clone(),
            edge_to:        self.edge_to.clone(),
            edge_length_m:  self.edge_length_m.clone(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Position of `node`, or `None` if it is not part of this graph.
    #[inline]
    pub fn position(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos.get(node.index()).copied()
    }

    /// Node positions, indexed by `NodeId`.
    pub fn node_positions(&self) -> &[GeoPoint] {
        &self.node_pos
    }

    /// Source node of each edge, indexed by `EdgeId`.
    pub fn edge_sources(&self) -> &[NodeId] {
        &self.edge_from
    }

    /// Target node of each edge, indexed by `EdgeId`.
    pub fn edge_targets(&self) -> &[NodeId] {
        &self.edge_to
    }

    /// Edge lengths in metres, indexed by `EdgeId`.  All finite and `>= 0`.
    pub fn edge_lengths_m(&self) -> &[f64] {
        &self.edge_length_m
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// # Panics
    /// Panics if `node` is not in the graph; check with [`contains`](Self::contains).
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// The edge `from -> to`, if one exists.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.contains(from) {
            return None;
        }
        let start = self.node_out_start[from.index()] as usize;
        let end   = self.node_out_start[from.index() + 1] as usize;
        self.edge_to[start..end]
            .binary_search(&to)
            .ok()
            .map(|i| EdgeId((start + i) as u32))
    }

    /// Weight of the edge `from -> to` in metres, if one exists.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.edge_between(from, to).map(|e| self.edge_length_m[e.index()])
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The graph's nearest-node index, built on the first call.
    pub fn nearest_index(&self) -> &NearestNodeIndex {
        self.index.get_or_init(|| NearestNodeIndex::new(&self.node_pos))
    }

    /// Shorthand for `nearest_index().nearest(pos)`.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.nearest_index().nearest(pos)
    }
}

impl std::fmt::Debug for StreetGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreetGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

fn check_weight(from: NodeId, to: NodeId, weight: f64) -> SpatialResult<()> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(SpatialError::InvalidWeight { from, to, weight })
    }
}

// ── StreetGraphBuilder ────────────────────────────────────────────────────────

/// Construct a [`StreetGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use sf_core::GeoPoint;
/// use sf_spatial::StreetGraphBuilder;
///
/// let mut b = StreetGraphBuilder::new();
/// let a = b.add_node(GeoPoint::new(49.840, 24.030));
/// let c = b.add_node(GeoPoint::new(49.841, 24.030));
/// b.add_street(a, c, 111.0);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // bidirectional
/// ```
#[derive(Clone, Debug, Default)]
pub struct StreetGraphBuilder {
    pub(crate) nodes:     Vec<GeoPoint>,
    pub(crate) raw_edges: Vec<RawEdge>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct RawEdge {
    pub(crate) from:     NodeId,
    pub(crate) to:       NodeId,
    pub(crate) length_m: f64,
}

impl StreetGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for bulk loading from OSM.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge.  Validation is deferred to [`build`](Self::build).
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) {
        self.raw_edges.push(RawEdge { from, to, length_m });
    }

    /// Add edges in both directions for a two-way street segment.
    pub fn add_street(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.add_directed_edge(a, b, length_m);
        self.add_directed_edge(b, a, length_m);
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> Option<GeoPoint> {
        self.nodes.get(id.index()).copied()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Collapse degree-2 pass-through nodes.  See [`crate::simplify`].
    pub fn simplify(self) -> Self {
        crate::simplify::simplify(self)
    }

    /// Validate, collapse parallel edges to their minimum weight, and lay
    /// out the CSR arrays.
    ///
    /// Time complexity: O(E log E) for the edge sort.
    pub fn build(self) -> SpatialResult<StreetGraph> {
        let node_count = self.nodes.len();

        for e in &self.raw_edges {
            if e.from.index() >= node_count || e.to.index() >= node_count {
                return Err(SpatialError::DanglingEdge { from: e.from, to: e.to, node_count });
            }
            check_weight(e.from, e.to, e.length_m)?;
        }

        // Sort by (from, to, weight) so the first edge of each run is the minimum.
        let mut raw = self.raw_edges;
        raw.sort_unstable_by(|a, b| {
            (a.from, a.to)
                .cmp(&(b.from, b.to))
                .then(a.length_m.total_cmp(&b.length_m))
        });
        raw.dedup_by(|later, first| later.from == first.from && later.to == first.to);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, raw.len());

        Ok(StreetGraph {
            node_pos:      self.nodes,
            node_out_start,
            edge_from:     raw.iter().map(|e| e.from).collect(),
            edge_to:       raw.iter().map(|e| e.to).collect(),
            edge_length_m: raw.iter().map(|e| e.length_m).collect(),
            index:         OnceLock::new(),
        })
    }
}
