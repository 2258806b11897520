//! Unit tests for sf-spatial.
//!
//! All tests use hand-crafted or seeded random graphs so they run without
//! any OSM extract.

#[cfg(test)]
mod helpers {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use sf_core::{GeoPoint, NodeId};

    use crate::{StreetGraph, StreetGraphBuilder};

    /// Small mixed one-way / two-way network.
    ///
    /// Nodes (lat, lon):
    ///   0:(0,0)  1:(0,1)  2:(0,2)
    ///   3:(1,0)           4:(1,2)
    ///
    /// Two-way: 0-1 (100), 1-2 (100), 0-3 (500), 3-4 (100)
    /// One-way: 2->4 (100)
    ///
    /// Shortest 0->4 is 0->1->2->4 = 300 m; 4->0 must go 4->3->0 = 600 m.
    pub fn grid_network() -> (StreetGraph, [NodeId; 5]) {
        let mut b = StreetGraphBuilder::new();
        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.0, 1.0));
        let n2 = b.add_node(GeoPoint::new(0.0, 2.0));
        let n3 = b.add_node(GeoPoint::new(1.0, 0.0));
        let n4 = b.add_node(GeoPoint::new(1.0, 2.0));

        b.add_street(n0, n1, 100.0);
        b.add_street(n1, n2, 100.0);
        b.add_directed_edge(n2, n4, 100.0);
        b.add_street(n0, n3, 500.0);
        b.add_street(n3, n4, 100.0);

        (b.build().unwrap(), [n0, n1, n2, n3, n4])
    }

    /// Random directed graph with integer weights (exact f64 sums).
    pub fn random_builder(seed: u64, nodes: usize, edges: usize) -> StreetGraphBuilder {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut b = StreetGraphBuilder::new();
        for i in 0..nodes {
            b.add_node(GeoPoint::new(49.8 + i as f64 * 1e-4, 24.0));
        }
        for _ in 0..edges {
            let from = NodeId(rng.gen_range(0..nodes as u32));
            let to = NodeId(rng.gen_range(0..nodes as u32));
            let w = rng.gen_range(0..50) as f64;
            b.add_directed_edge(from, to, w);
        }
        b
    }

    /// All-pairs shortest distances by Floyd–Warshall over the built graph.
    pub fn brute_force(graph: &StreetGraph) -> Vec<Vec<f64>> {
        let n = graph.node_count();
        let mut d = vec![vec![f64::INFINITY; n]; n];
        for (i, row) in d.iter_mut().enumerate() {
            row[i] = 0.0;
        }
        for e in 0..graph.edge_count() {
            let (u, v) = (graph.edge_from[e].index(), graph.edge_to[e].index());
            d[u][v] = d[u][v].min(graph.edge_length_m[e]);
        }
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let via = d[i][k] + d[k][j];
                    if via < d[i][j] {
                        d[i][j] = via;
                    }
                }
            }
        }
        d
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use sf_core::{GeoPoint, NodeId};

    use crate::{GraphParts, SpatialError, StreetGraph, StreetGraphBuilder};

    #[test]
    fn empty_build() {
        let g = StreetGraphBuilder::new().build().unwrap();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
        assert!(StreetGraph::empty().is_empty());
    }

    #[test]
    fn csr_degrees() {
        let (g, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        assert_eq!(g.out_degree(n0), 2);
        assert_eq!(g.out_degree(n1), 2);
        assert_eq!(g.out_degree(n2), 2); // ->1, ->4
        assert_eq!(g.out_degree(n3), 2);
        assert_eq!(g.out_degree(n4), 1); // ->3 only, 2->4 is one-way
        for e in g.out_edges(n0) {
            assert_eq!(g.edge_from[e.index()], n0);
        }
    }

    #[test]
    fn edges_are_not_symmetric() {
        let (g, [_, _, n2, _, n4]) = super::helpers::grid_network();
        assert_eq!(g.edge_weight(n2, n4), Some(100.0));
        assert_eq!(g.edge_weight(n4, n2), None);
    }

    #[test]
    fn parallel_edges_collapse_to_minimum() {
        let mut b = StreetGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, 80.0);
        b.add_directed_edge(a, c, 30.0);
        b.add_directed_edge(a, c, 55.0);
        let g = b.build().unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge_weight(a, c), Some(30.0));
    }

    #[test]
    fn negative_weight_rejected() {
        let mut b = StreetGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, -1.0);
        assert!(matches!(b.build(), Err(SpatialError::InvalidWeight { .. })));
    }

    #[test]
    fn nan_weight_rejected() {
        let mut b = StreetGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        b.add_directed_edge(a, a, f64::NAN);
        assert!(matches!(b.build(), Err(SpatialError::InvalidWeight { .. })));
    }

    #[test]
    fn dangling_edge_rejected() {
        let mut b = StreetGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        b.add_directed_edge(a, NodeId(9), 1.0);
        assert!(matches!(b.build(), Err(SpatialError::DanglingEdge { .. })));
    }

    #[test]
    fn parts_roundtrip_preserves_graph() {
        let (g, _) = super::helpers::grid_network();
        let back = StreetGraph::from_parts(g.to_parts()).unwrap();
        assert_eq!(back.to_parts(), g.to_parts());
        assert_eq!(back.edge_from, g.edge_from);
    }

    #[test]
    fn from_parts_rejects_negative_weight() {
        let (g, _) = super::helpers::grid_network();
        let mut parts: GraphParts = g.to_parts();
        parts.edge_length_m[0] = -5.0;
        assert!(matches!(
            StreetGraph::from_parts(parts),
            Err(SpatialError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn from_parts_rejects_bad_row_pointer() {
        let (g, _) = super::helpers::grid_network();
        let mut parts = g.to_parts();
        parts.node_out_start.pop();
        assert!(matches!(StreetGraph::from_parts(parts), Err(SpatialError::Layout(_))));
    }

    #[test]
    fn read_only_views_match_lookups() {
        let (g, _) = super::helpers::grid_network();
        assert_eq!(g.node_positions().len(), g.node_count());
        assert_eq!(g.edge_sources().len(), g.edge_count());
        assert_eq!(g.edge_targets().len(), g.edge_count());
        assert!(g.edge_lengths_m().iter().all(|&w| w.is_finite() && w >= 0.0));
        for e in 0..g.edge_count() {
            let (from, to) = (g.edge_sources()[e], g.edge_targets()[e]);
            assert_eq!(g.edge_weight(from, to), Some(g.edge_lengths_m()[e]));
            assert_eq!(g.position(from), Some(g.node_positions()[from.index()]));
        }
    }
}

// ── Simplification ────────────────────────────────────────────────────────────

#[cfg(test)]
mod simplify {
    use sf_core::GeoPoint;

    use crate::{DijkstraEngine, ShortestPathEngine, StreetGraphBuilder};

    #[test]
    fn one_way_chain_collapses() {
        // S -> B -> D: B is pass-through.
        let mut b = StreetGraphBuilder::new();
        let s = b.add_node(GeoPoint::new(0.0, 0.0));
        let m = b.add_node(GeoPoint::new(0.0, 0.001));
        let d = b.add_node(GeoPoint::new(0.0, 0.002));
        b.add_directed_edge(s, m, 100.0);
        b.add_directed_edge(m, d, 200.0);
        let g = b.simplify().build().unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge_length_m[0], 300.0);
        assert_eq!(g.node_pos[1], GeoPoint::new(0.0, 0.002));
    }

    #[test]
    fn two_way_chain_collapses_both_directions() {
        let mut b = StreetGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let m1 = b.add_node(GeoPoint::new(0.0, 0.001));
        let m2 = b.add_node(GeoPoint::new(0.0, 0.002));
        let c = b.add_node(GeoPoint::new(0.0, 0.003));
        b.add_street(a, m1, 10.0);
        b.add_street(m1, m2, 20.0);
        b.add_street(m2, c, 30.0);
        let g = b.simplify().build().unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        assert!(g.edge_length_m.iter().all(|&w| w == 60.0));
    }

    #[test]
    fn junctions_and_dead_ends_survive() {
        let (g, _) = super::helpers::grid_network();
        let mut b = StreetGraphBuilder::new();
        for &p in &g.node_pos {
            b.add_node(p);
        }
        for e in 0..g.edge_count() {
            b.add_directed_edge(g.edge_from[e], g.edge_to[e], g.edge_length_m[e]);
        }
        // Dead-end spur from node 0.
        let spur = b.add_node(GeoPoint::new(-1.0, 0.0));
        b.add_street(sf_core::NodeId(0), spur, 5.0);
        let simplified = b.simplify().build().unwrap();
        assert!(simplified.node_pos.contains(&GeoPoint::new(-1.0, 0.0)));
    }

    #[test]
    fn shortest_distances_preserved() {
        for seed in 0..20 {
            let builder = super::helpers::random_builder(seed, 30, 70);
            let full = builder.clone().build().unwrap();
            let simple = builder.simplify().build().unwrap();
            let full_d = super::helpers::brute_force(&full);
            let simple_d = super::helpers::brute_force(&simple);

            // Survivors keep their relative order, so map by position.
            let map: Vec<usize> = simple
                .node_pos
                .iter()
                .map(|p| full.node_pos.iter().position(|q| q == p).unwrap())
                .collect();
            for (i, &fi) in map.iter().enumerate() {
                for (j, &fj) in map.iter().enumerate() {
                    assert_eq!(simple_d[i][j], full_d[fi][fj], "seed {seed}: {fi}->{fj}");
                }
            }

            // And Dijkstra agrees on the simplified graph.
            let tree = DijkstraEngine.shortest_paths(&simple, sf_core::NodeId(0)).unwrap();
            for j in 0..simple.node_count() {
                assert_eq!(tree.distance(sf_core::NodeId(j as u32)), simple_d[0][j]);
            }
        }
    }
}

// ── Nearest-node index ────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use sf_core::{GeoPoint, NodeId};

    use crate::{NearestNodeIndex, StreetGraphBuilder};

    #[test]
    fn exact_position() {
        let (g, [n0, ..]) = super::helpers::grid_network();
        assert_eq!(g.snap_to_node(GeoPoint::new(0.0, 0.0)), Some(n0));
    }

    #[test]
    fn nearest_wins() {
        let (g, [n0, n1, ..]) = super::helpers::grid_network();
        assert_eq!(g.snap_to_node(GeoPoint::new(0.0, 0.4)), Some(n0));
        assert_eq!(g.snap_to_node(GeoPoint::new(0.0, 0.6)), Some(n1));
    }

    #[test]
    fn ties_go_to_lowest_id() {
        // Query is exactly halfway between four nodes; ids assigned in
        // reverse spatial order so the lowest id is not the first inserted
        // position in the tree.
        let positions = [
            GeoPoint::new(0.001, 0.001),
            GeoPoint::new(-0.001, 0.001),
            GeoPoint::new(0.001, -0.001),
            GeoPoint::new(-0.001, -0.001),
        ];
        let index = NearestNodeIndex::new(&positions);
        for _ in 0..10 {
            assert_eq!(index.nearest(GeoPoint::new(0.0, 0.0)), Some(NodeId(0)));
        }
    }

    #[test]
    fn duplicate_positions_pick_lowest_id() {
        let mut b = StreetGraphBuilder::new();
        let p = GeoPoint::new(49.84, 24.03);
        b.add_node(GeoPoint::new(49.90, 24.10));
        let first = b.add_node(p);
        b.add_node(p);
        let g = b.build().unwrap();
        assert_eq!(g.snap_to_node(p), Some(first));
    }

    #[test]
    fn empty_graph_returns_none() {
        let g = StreetGraphBuilder::new().build().unwrap();
        assert!(g.snap_to_node(GeoPoint::new(0.0, 0.0)).is_none());
        assert!(g.nearest_index().is_empty());
    }

    #[test]
    fn index_is_built_once() {
        let (g, _) = super::helpers::grid_network();
        let a: *const NearestNodeIndex = g.nearest_index();
        let b: *const NearestNodeIndex = g.nearest_index();
        assert_eq!(a, b);
        assert_eq!(g.nearest_index().len(), 5);
    }

    #[test]
    fn k_nearest_order() {
        let (g, nodes) = super::helpers::grid_network();
        let nearest = g.nearest_index().k_nearest(GeoPoint::new(0.0, 0.1), 2);
        assert_eq!(nearest[0], nodes[0]);
        assert!(nearest[1] == nodes[1] || nearest[1] == nodes[3]);
    }
}

// ── Shortest paths ────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use sf_core::{GeoPoint, NodeId};

    use crate::{DijkstraEngine, ShortestPathEngine, SpatialError, StreetGraphBuilder};

    #[test]
    fn scenario_chain() {
        let mut b = StreetGraphBuilder::new();
        let s = b.add_node(GeoPoint::new(0.0, 0.0));
        let m = b.add_node(GeoPoint::new(0.0, 0.001));
        let d = b.add_node(GeoPoint::new(0.0, 0.002));
        b.add_directed_edge(s, m, 100.0);
        b.add_directed_edge(m, d, 200.0);
        let g = b.build().unwrap();

        let tree = DijkstraEngine.shortest_paths(&g, s).unwrap();
        assert_eq!(tree.distance(d), 300.0);
        assert_eq!(tree.path_to(d), Some(vec![s, m, d]));
        assert_eq!(tree.predecessor(s), None);
    }

    #[test]
    fn respects_direction() {
        let (g, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        let from0 = DijkstraEngine.shortest_paths(&g, n0).unwrap();
        assert_eq!(from0.distance(n4), 300.0);
        assert_eq!(from0.path_to(n4), Some(vec![n0, n1, n2, n4]));

        let from4 = DijkstraEngine.shortest_paths(&g, n4).unwrap();
        assert_eq!(from4.distance(n0), 600.0);
        assert_eq!(from4.path_to(n0), Some(vec![n4, n3, n0]));
    }

    #[test]
    fn unreached_nodes_are_infinite() {
        let mut b = StreetGraphBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(1.0, 0.0));
        let g = b.build().unwrap();
        let tree = DijkstraEngine.shortest_paths(&g, a).unwrap();
        assert!(tree.distance(c).is_infinite());
        assert!(!tree.is_reachable(c));
        assert_eq!(tree.path_to(c), None);
        assert_eq!(tree.predecessor(c), None);
        assert_eq!(tree.reachable_count(), 1);
    }

    #[test]
    fn unknown_source_rejected() {
        let (g, _) = super::helpers::grid_network();
        let err = DijkstraEngine.shortest_paths(&g, NodeId(99)).unwrap_err();
        assert!(matches!(err, SpatialError::NodeNotFound(NodeId(99))));
    }

    #[test]
    fn equal_cost_tie_keeps_first_relaxation() {
        // s -> a -> t and s -> b -> t, both 20 m.  a is relaxed before b
        // (lower CSR position), so a is settled first and claims t.
        let mut b = StreetGraphBuilder::new();
        let s = b.add_node(GeoPoint::new(0.0, 0.0));
        let a = b.add_node(GeoPoint::new(0.0, 0.001));
        let bb = b.add_node(GeoPoint::new(0.001, 0.0));
        let t = b.add_node(GeoPoint::new(0.001, 0.001));
        b.add_directed_edge(s, a, 10.0);
        b.add_directed_edge(s, bb, 10.0);
        b.add_directed_edge(a, t, 10.0);
        b.add_directed_edge(bb, t, 10.0);
        let g = b.build().unwrap();
        for _ in 0..5 {
            let tree = DijkstraEngine.shortest_paths(&g, s).unwrap();
            assert_eq!(tree.path_to(t), Some(vec![s, a, t]));
        }
    }

    #[test]
    fn optimal_against_brute_force() {
        for seed in 100..130 {
            let g = super::helpers::random_builder(seed, 25, 80).build().unwrap();
            let all = super::helpers::brute_force(&g);
            for src in [0u32, 7, 24] {
                let tree = DijkstraEngine.shortest_paths(&g, NodeId(src)).unwrap();
                for v in 0..g.node_count() {
                    let node = NodeId(v as u32);
                    assert_eq!(tree.distance(node), all[src as usize][v], "seed {seed}");

                    // Path contiguity and distance consistency.
                    if let Some(path) = tree.path_to(node) {
                        let mut sum = 0.0;
                        for pair in path.windows(2) {
                            let w = g.edge_weight(pair[0], pair[1]);
                            assert!(w.is_some(), "missing edge {}->{}", pair[0], pair[1]);
                            sum += w.unwrap();
                        }
                        assert_eq!(sum, tree.distance(node));
                    }
                }
            }
        }
    }
}

// ── Cache artefact ────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use crate::cache::{read_graph, write_graph};
    use crate::SpatialError;

    #[test]
    fn write_then_read_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("grid.sfgraph");
        let (g, _) = super::helpers::grid_network();
        write_graph(&path, &g).unwrap();
        let back = read_graph(&path).unwrap();
        assert_eq!(back.to_parts(), g.to_parts());
    }

    #[test]
    fn garbage_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.sfgraph");
        std::fs::write(&path, b"definitely not a graph").unwrap();
        let err = read_graph(&path).unwrap_err();
        assert!(matches!(
            err,
            SpatialError::CacheCodec { .. } | SpatialError::InvalidCache { .. }
        ));
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod repository {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use sf_core::{GeoPoint, NetworkType};

    use crate::{
        area_slug, FnGraphSource, SpatialError, SpatialResult, StreetGraphBuilder,
        StreetGraphRepository,
    };

    type Built = SpatialResult<StreetGraphBuilder>;

    fn chain_builder() -> StreetGraphBuilder {
        let mut b = StreetGraphBuilder::new();
        let s = b.add_node(GeoPoint::new(49.840, 24.030));
        let m = b.add_node(GeoPoint::new(49.841, 24.030));
        let d = b.add_node(GeoPoint::new(49.842, 24.030));
        b.add_directed_edge(s, m, 100.0);
        b.add_directed_edge(m, d, 200.0);
        b
    }

    #[test]
    fn slug() {
        assert_eq!(area_slug("Lviv, Ukraine").as_deref(), Some("lviv-ukraine"));
        assert_eq!(area_slug("  Львів, Україна ").as_deref(), Some("львів-україна"));
        assert_eq!(area_slug("!!"), None);
    }

    #[test]
    fn builds_simplifies_and_reuses() {
        let calls = AtomicUsize::new(0);
        let repo = StreetGraphRepository::new(
            FnGraphSource(|_: &str, _: NetworkType| -> Built {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(chain_builder())
            }),
            NetworkType::Walk,
        );
        let a = repo.load("Lviv, Ukraine").unwrap();
        let b = repo.load("Lviv, Ukraine").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.node_count(), 2); // middle node collapsed
        assert_eq!(a.edge_length_m, vec![300.0]);
    }

    #[test]
    fn simplification_can_be_disabled() {
        let repo = StreetGraphRepository::new(
            FnGraphSource(|_: &str, _: NetworkType| -> Built { Ok(chain_builder()) }),
            NetworkType::Walk,
        )
        .with_simplification(false);
        assert_eq!(repo.load("x").unwrap().node_count(), 3);
    }

    #[test]
    fn cache_hit_skips_source() {
        let dir = tempfile::tempdir().unwrap();
        let first = StreetGraphRepository::new(
            FnGraphSource(|_: &str, _: NetworkType| -> Built { Ok(chain_builder()) }),
            NetworkType::Drive,
        )
        .with_cache_dir(dir.path());
        let built = first.load("Lviv, Ukraine").unwrap();
        let path = first.cache_path("Lviv, Ukraine").unwrap();
        assert!(path.ends_with("lviv-ukraine-drive.sfgraph"));
        assert!(path.exists());

        // A fresh repository (new process) must not call the source.
        let second = StreetGraphRepository::new(
            FnGraphSource(|area: &str, _: NetworkType| -> Built {
                Err(SpatialError::PlaceNotFound { area: area.to_owned() })
            }),
            NetworkType::Drive,
        )
        .with_cache_dir(dir.path());
        let cached = second.load("Lviv, Ukraine").unwrap();
        assert_eq!(cached.to_parts(), built.to_parts());
    }

    #[test]
    fn network_type_is_part_of_cache_key() {
        let dir = tempfile::tempdir().unwrap();
        let walk = StreetGraphRepository::new(
            FnGraphSource(|_: &str, _: NetworkType| -> Built { Ok(chain_builder()) }),
            NetworkType::Walk,
        )
        .with_cache_dir(dir.path());
        let drive = StreetGraphRepository::new(
            FnGraphSource(|_: &str, _: NetworkType| -> Built { Ok(chain_builder()) }),
            NetworkType::Drive,
        )
        .with_cache_dir(dir.path());
        assert_ne!(walk.cache_path("Lviv"), drive.cache_path("Lviv"));
    }

    #[test]
    fn nameless_areas_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let repo = StreetGraphRepository::new(
            FnGraphSource(|_: &str, _: NetworkType| -> Built { Ok(chain_builder()) }),
            NetworkType::Walk,
        )
        .with_cache_dir(dir.path());
        assert_eq!(repo.cache_path("!!"), None);
        assert_eq!(repo.cache_path("??"), None);

        let a = repo.load("!!").unwrap();
        let b = repo.load("??").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn corrupt_cache_is_rebuilt() {
        let dir = tempfile::tempdir().unwrap();
        let calls = AtomicUsize::new(0);
        let repo = StreetGraphRepository::new(
            FnGraphSource(|_: &str, _: NetworkType| -> Built {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(chain_builder())
            }),
            NetworkType::Walk,
        )
        .with_cache_dir(dir.path());
        let path = repo.cache_path("Lviv").unwrap();
        std::fs::write(&path, b"garbage").unwrap();

        let g = repo.load("Lviv").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(crate::cache::read_graph(&path).unwrap().to_parts(), g.to_parts());
    }

    #[test]
    fn failure_is_fatal_and_retried_later() {
        let calls = AtomicUsize::new(0);
        let repo = StreetGraphRepository::new(
            FnGraphSource(|area: &str, _: NetworkType| -> Built {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SpatialError::PlaceNotFound { area: area.to_owned() })
            }),
            NetworkType::Walk,
        );
        assert!(matches!(repo.load("Atlantis"), Err(SpatialError::PlaceNotFound { .. })));
        assert!(repo.load("Atlantis").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_first_loads_build_once() {
        let calls = AtomicUsize::new(0);
        let repo = StreetGraphRepository::new(
            FnGraphSource(|_: &str, _: NetworkType| -> Built {
                calls.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(50));
                Ok(chain_builder())
            }),
            NetworkType::Walk,
        );

        let graphs: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| repo.load("Lviv").unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(graphs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}

// ── OSM extracts ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "osm"))]
mod osm {
    use sf_core::NetworkType;

    use crate::osm::{way_direction, Direction, PbfGraphSource};
    use crate::{GraphSource, SpatialError};

    #[test]
    fn walk_network_ignores_oneway() {
        let tags = [("highway", "residential"), ("oneway", "yes")];
        assert_eq!(way_direction(NetworkType::Walk, &tags), Some(Direction::Both));
        assert_eq!(way_direction(NetworkType::Drive, &tags), Some(Direction::Forward));
    }

    #[test]
    fn footway_is_walk_only() {
        let tags = [("highway", "footway")];
        assert_eq!(way_direction(NetworkType::Walk, &tags), Some(Direction::Both));
        assert_eq!(way_direction(NetworkType::Drive, &tags), None);
    }

    #[test]
    fn motorway_is_drive_only_and_implicitly_oneway() {
        let tags = [("highway", "motorway")];
        assert_eq!(way_direction(NetworkType::Walk, &tags), None);
        assert_eq!(way_direction(NetworkType::Drive, &tags), Some(Direction::Forward));
    }

    #[test]
    fn reverse_oneway() {
        let tags = [("highway", "primary"), ("oneway", "-1")];
        assert_eq!(way_direction(NetworkType::Drive, &tags), Some(Direction::Backward));
    }

    #[test]
    fn private_access_excluded() {
        let tags = [("highway", "service"), ("access", "private")];
        assert_eq!(way_direction(NetworkType::Drive, &tags), None);
        assert_eq!(way_direction(NetworkType::Walk, &tags), None);
        let foot_ok = [("highway", "service"), ("access", "private"), ("foot", "yes")];
        assert_eq!(way_direction(NetworkType::Walk, &foot_ok), Some(Direction::Both));
    }

    #[test]
    fn missing_extract_is_place_not_found() {
        let source = PbfGraphSource::new("/nonexistent-dir");
        let err = source.build("Atlantis", NetworkType::Walk).unwrap_err();
        assert!(matches!(err, SpatialError::PlaceNotFound { .. }));
        let path = source.extract_path("Lviv, Ukraine").unwrap();
        assert!(path.ends_with("lviv-ukraine.osm.pbf"));
        assert!(source.extract_path("?!").is_none());
        assert!(matches!(
            source.build("?!", NetworkType::Walk),
            Err(SpatialError::PlaceNotFound { .. })
        ));
    }
}
