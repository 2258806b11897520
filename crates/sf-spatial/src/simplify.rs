//! Degree-2 node simplification.
//!
//! OSM ways contain many intermediate points that only describe street
//! geometry.  A node `v` is a *pass-through* node when every path through it
//! enters from one neighbour and leaves to another:
//!
//! - one-way: `in(v) = {u}`, `out(v) = {w}`, `u != w`
//!   → replaced by `u -> w` with weight `w(u,v) + w(v,w)`;
//! - two-way: `in(v) = out(v) = {a, b}`
//!   → replaced by `a -> b` and `b -> a` with the summed weights.
//!
//! A replacement edge that duplicates an existing edge keeps the smaller
//! weight.  Every shortest-path distance between surviving nodes is
//! therefore unchanged.  Removal repeats until no pass-through node is left;
//! survivors are renumbered densely in their original order.

use std::collections::BTreeMap;

use sf_core::NodeId;

use crate::network::{RawEdge, StreetGraphBuilder};

type Adjacency = Vec<BTreeMap<u32, f64>>;

/// Return a builder with every pass-through node removed.
pub fn simplify(builder: StreetGraphBuilder) -> StreetGraphBuilder {
    let StreetGraphBuilder { nodes, raw_edges } = builder;
    let n = nodes.len();

    // Dangling edges and bad weights are left for `build()` to report.
    let malformed = raw_edges.iter().any(|e| {
        e.from.index() >= n || e.to.index() >= n || !(e.length_m.is_finite() && e.length_m >= 0.0)
    });
    if malformed {
        return StreetGraphBuilder { nodes, raw_edges };
    }

    let mut out: Adjacency = vec![BTreeMap::new(); n];
    let mut inc: Adjacency = vec![BTreeMap::new(); n];
    for e in &raw_edges {
        insert_min(&mut out, &mut inc, e.from.0, e.to.0, e.length_m);
    }

    let mut removed = vec![false; n];
    loop {
        let mut changed = false;
        for v in 0..n as u32 {
            if removed[v as usize] {
                continue;
            }
            let Some(bypass) = pass_through(v, &out, &inc) else {
                continue;
            };
            detach(v, &mut out, &mut inc);
            for (a, b, w) in bypass {
                insert_min(&mut out, &mut inc, a, b, w);
            }
            removed[v as usize] = true;
            changed = true;
        }
        if !changed {
            break;
        }
    }

    // ── Renumber survivors ────────────────────────────────────────────────
    let mut new_id = vec![NodeId::INVALID; n];
    let mut kept_nodes = Vec::with_capacity(n);
    for (old, pos) in nodes.into_iter().enumerate() {
        if !removed[old] {
            new_id[old] = NodeId(kept_nodes.len() as u32);
            kept_nodes.push(pos);
        }
    }

    let mut kept_edges = Vec::new();
    for (from, row) in out.iter().enumerate() {
        for (&to, &length_m) in row {
            kept_edges.push(RawEdge {
                from: new_id[from],
                to:   new_id[to as usize],
                length_m,
            });
        }
    }

    log::debug!(
        "simplified street graph: {} -> {} nodes, {} -> {} edges",
        n,
        kept_nodes.len(),
        raw_edges.len(),
        kept_edges.len()
    );

    StreetGraphBuilder { nodes: kept_nodes, raw_edges: kept_edges }
}

fn insert_min(out: &mut Adjacency, inc: &mut Adjacency, from: u32, to: u32, w: f64) {
    let slot = out[from as usize].entry(to).or_insert(w);
    if w < *slot {
        *slot = w;
    }
    let best = *slot;
    inc[to as usize].insert(from, best);
}

/// Replacement edges for `v`, or `None` if `v` is not a pass-through node.
fn pass_through(v: u32, out: &Adjacency, inc: &Adjacency) -> Option<Vec<(u32, u32, f64)>> {
    let o = &out[v as usize];
    let i = &inc[v as usize];
    if o.contains_key(&v) {
        return None;
    }
    match (i.len(), o.len()) {
        (1, 1) => {
            let (&u, &w_in) = i.iter().next()?;
            let (&w, &w_out) = o.iter().next()?;
            if u == w {
                return None;
            }
            Some(vec![(u, w, w_in + w_out)])
        }
        (2, 2) => {
            if !i.keys().eq(o.keys()) {
                return None;
            }
            let mut keys = i.keys().copied();
            let (a, b) = (keys.next()?, keys.next()?);
            Some(vec![
                (a, b, i[&a] + o[&b]),
                (b, a, i[&b] + o[&a]),
            ])
        }
        _ => None,
    }
}

fn detach(v: u32, out: &mut Adjacency, inc: &mut Adjacency) {
    let preds: Vec<u32> = inc[v as usize].keys().copied().collect();
    let succs: Vec<u32> = out[v as usize].keys().copied().collect();
    for u in preds {
        out[u as usize].remove(&v);
    }
    for w in succs {
        inc[w as usize].remove(&v);
    }
    out[v as usize].clear();
    inc[v as usize].clear();
}
