//! Single-source shortest paths.
//!
//! # Pluggability
//!
//! The route pipeline calls the search through the [`ShortestPathEngine`]
//! trait, so another algorithm can be dropped in without touching the
//! assembler.  [`DijkstraEngine`] is the default.
//!
//! # Full-tree search
//!
//! The target is not known in advance (it is whichever candidate destination
//! turns out closest), so the search runs until every node reachable from the
//! source is settled and returns the whole [`ShortestPathTree`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use sf_core::NodeId;

use crate::network::StreetGraph;
use crate::{SpatialError, SpatialResult};

// ── ShortestPathTree ──────────────────────────────────────────────────────────

/// Distance and predecessor maps from one search.
///
/// Owned by the request that ran the search; nothing in it is shared.
#[derive(Clone, Debug)]
pub struct ShortestPathTree {
    source: NodeId,
    /// `dist[v]` = shortest distance in metres, `f64::INFINITY` if unreached.
    dist:   Vec<f64>,
    /// `pred[v]` = previous node on the shortest path, `INVALID` for the
    /// source and for unreached nodes.
    pred:   Vec<NodeId>,
}

impl ShortestPathTree {
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Shortest distance to `node` in metres; infinite if unreached or unknown.
    pub fn distance(&self, node: NodeId) -> f64 {
        self.dist.get(node.index()).copied().unwrap_or(f64::INFINITY)
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.distance(node).is_finite()
    }

    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.pred.get(node.index()).copied().filter(|p| p.is_valid())
    }

    /// Number of nodes with a finite distance (including the source).
    pub fn reachable_count(&self) -> usize {
        self.dist.iter().filter(|d| d.is_finite()).count()
    }

    /// Node sequence from the source to `target`, both inclusive.
    ///
    /// Returns `None` if `target` is unreachable.
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        if !self.is_reachable(target) {
            return None;
        }
        let mut path = vec![target];
        let mut cur = target;
        while let Some(prev) = self.predecessor(cur) {
            // A predecessor chain longer than the node count means a cycle.
            if path.len() > self.dist.len() {
                return None;
            }
            path.push(prev);
            cur = prev;
        }
        path.reverse();
        (path.first() == Some(&self.source)).then_some(path)
    }
}

// ── Engine trait ──────────────────────────────────────────────────────────────

/// Pluggable single-source shortest-path search.
///
/// Implementations must be `Send + Sync`: one engine value serves every
/// concurrent request.
pub trait ShortestPathEngine: Send + Sync {
    /// Settle every node reachable from `source` over directed edges.
    fn shortest_paths(&self, graph: &StreetGraph, source: NodeId) -> SpatialResult<ShortestPathTree>;
}

// ── DijkstraEngine ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm with a binary heap and a settled set.
///
/// Edge weights are the CSR `edge_length_m` values, which `StreetGraph`
/// guarantees are finite and non-negative.
///
/// Ties between equal tentative distances are popped in the order they were
/// pushed, and relaxation only replaces a predecessor on a strict
/// improvement, so the first relaxation of a node keeps it.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraEngine;

impl ShortestPathEngine for DijkstraEngine {
    fn shortest_paths(&self, graph: &StreetGraph, source: NodeId) -> SpatialResult<ShortestPathTree> {
        dijkstra(graph, source)
    }
}

/// Heap entry.  Ordered so that `BinaryHeap` (a max-heap) pops the smallest
/// distance first and, among equal distances, the earliest push.
#[derive(Copy, Clone, Debug)]
struct State {
    dist: f64,
    seq:  u64,
    node: NodeId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

fn dijkstra(graph: &StreetGraph, source: NodeId) -> SpatialResult<ShortestPathTree> {
    if !graph.contains(source) {
        return Err(SpatialError::NodeNotFound(source));
    }

    let n = graph.node_count();
    let mut dist    = vec![f64::INFINITY; n];
    let mut pred    = vec![NodeId::INVALID; n];
    let mut settled = vec![false; n];

    dist[source.index()] = 0.0;

    let mut seq: u64 = 0;
    let mut heap = BinaryHeap::new();
    heap.push(State { dist: 0.0, seq, node: source });

    while let Some(State { dist: d, node, .. }) = heap.pop() {
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;

        for edge in graph.out_edges(node) {
            let next = graph.edge_to[edge.index()];
            if settled[next.index()] {
                continue;
            }
            let candidate = d + graph.edge_length_m[edge.index()];
            if candidate < dist[next.index()] {
                dist[next.index()] = candidate;
                pred[next.index()] = node;
                seq += 1;
                heap.push(State { dist: candidate, seq, node: next });
            }
        }
    }

    Ok(ShortestPathTree { source, dist, pred })
}
