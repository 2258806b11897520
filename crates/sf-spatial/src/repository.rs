//! Cached, single-flight street graph loading.
//!
//! [`StreetGraphRepository::load`] resolves an area name to a shared
//! `Arc<StreetGraph>`:
//!
//! 1. already loaded in this process → return the same `Arc`;
//! 2. cache artefact on disk → decode it, no geodata access;
//! 3. otherwise → ask the [`GraphSource`], simplify, persist, return.
//!
//! Concurrent first calls for one area serialize on a per-area lock, so
//! only one of them reaches step 2 or 3; the rest receive its result.  A
//! failed load leaves the slot empty and the next call tries again.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use sf_core::NetworkType;

use crate::network::{StreetGraph, StreetGraphBuilder};
use crate::{cache, SpatialResult};

// ── GraphSource ───────────────────────────────────────────────────────────────

/// Builds an unsimplified street graph for a named place.
///
/// This is the expensive, geodata-backed step that the repository caches.
pub trait GraphSource: Send + Sync {
    fn build(&self, area: &str, network: NetworkType) -> SpatialResult<StreetGraphBuilder>;
}

/// [`GraphSource`] backed by a closure.  Handy for synthetic areas and tests.
pub struct FnGraphSource<F>(pub F);

impl<F> GraphSource for FnGraphSource<F>
where
    F: Fn(&str, NetworkType) -> SpatialResult<StreetGraphBuilder> + Send + Sync,
{
    fn build(&self, area: &str, network: NetworkType) -> SpatialResult<StreetGraphBuilder> {
        (self.0)(area, network)
    }
}

// ── StreetGraphRepository ─────────────────────────────────────────────────────

type Slot = Arc<Mutex<Option<Arc<StreetGraph>>>>;

pub struct StreetGraphRepository<S: GraphSource> {
    source:    S,
    network:   NetworkType,
    cache_dir: Option<PathBuf>,
    simplify:  bool,
    slots:     Mutex<HashMap<String, Slot>>,
}

impl<S: GraphSource> StreetGraphRepository<S> {
    /// Repository without an on-disk cache; simplification enabled.
    pub fn new(source: S, network: NetworkType) -> Self {
        Self {
            source,
            network,
            cache_dir: None,
            simplify:  true,
            slots:     Mutex::new(HashMap::new()),
        }
    }

    /// Persist built graphs under `dir` and read them back on later runs.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Toggle degree-2 simplification of freshly built graphs.
    pub fn with_simplification(mut self, enabled: bool) -> Self {
        self.simplify = enabled;
        self
    }

    pub fn network(&self) -> NetworkType {
        self.network
    }

    /// Cache artefact location for `area`, if a cache directory is set.
    ///
    /// The network type is part of the file name: a walk graph and a drive
    /// graph of the same place are different artefacts.
    ///
    /// `None` also for an area name with no letters or digits: such names
    /// would all share one file, so their graphs stay in memory only.
    pub fn cache_path(&self, area: &str) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        let Some(slug) = area_slug(area) else {
            log::debug!("not caching street graph for {area:?}: name has no usable characters");
            return None;
        };
        Some(dir.join(format!("{slug}-{}.sfgraph", self.network)))
    }

    /// Shared graph for `area`, built at most once per process.
    pub fn load(&self, area: &str) -> SpatialResult<Arc<StreetGraph>> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(area.to_owned()).or_default())
        };

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(graph) = guard.as_ref() {
            return Ok(Arc::clone(graph));
        }

        let graph = Arc::new(self.load_uncached(area)?);
        *guard = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// Write `graph` to the cache artefact for `area`.  No-op without a
    /// cache directory.
    pub fn save(&self, area: &str, graph: &StreetGraph) -> SpatialResult<()> {
        match self.cache_path(area) {
            Some(path) => cache::write_graph(&path, graph),
            None => Ok(()),
        }
    }

    fn load_uncached(&self, area: &str) -> SpatialResult<StreetGraph> {
        if let Some(path) = self.cache_path(area) {
            if let Some(graph) = read_cached(&path) {
                log::info!(
                    "loaded {} street graph for {area:?} from {} ({} nodes, {} edges)",
                    self.network,
                    path.display(),
                    graph.node_count(),
                    graph.edge_count()
                );
                return Ok(graph);
            }
        }

        log::info!("building {} street graph for {area:?}", self.network);
        let mut builder = self.source.build(area, self.network)?;
        if self.simplify {
            builder = builder.simplify();
        }
        let graph = builder.build()?;
        log::info!(
            "built street graph for {area:?}: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        // A graph that cannot be persisted is still usable for this process.
        if let Err(e) = self.save(area, &graph) {
            log::warn!("could not persist street graph for {area:?}: {e}");
        }
        Ok(graph)
    }
}

fn read_cached(path: &Path) -> Option<StreetGraph> {
    if !path.exists() {
        return None;
    }
    match cache::read_graph(path) {
        Ok(graph) => Some(graph),
        Err(e) => {
            log::warn!("ignoring unusable graph cache {}: {e}", path.display());
            None
        }
    }
}

/// File-system friendly key for a place name: lowercase alphanumerics with
/// single `-` separators (`"Lviv, Ukraine"` → `"lviv-ukraine"`).
///
/// `None` if the name has no alphanumeric characters at all.
pub fn area_slug(area: &str) -> Option<String> {
    let mut slug = String::with_capacity(area.len());
    for c in area.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    (!slug.is_empty()).then_some(slug)
}
