//! `sf-spatial`: street graph, spatial indexing, and shortest paths.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`network`]    | `StreetGraph` (CSR), `StreetGraphBuilder`                  |
//! | [`simplify`]   | Degree-2 pass-through node collapsing                      |
//! | [`index`]      | `NearestNodeIndex` (R-tree over projected coordinates)     |
//! | [`engine`]     | `ShortestPathEngine` trait, `DijkstraEngine`, `ShortestPathTree` |
//! | [`cache`]      | On-disk graph artefact (`SFSG` + bincode)                  |
//! | [`repository`] | `StreetGraphRepository`, `GraphSource`, `FnGraphSource`    |
//! | [`osm`]        | `load_from_pbf`, `PbfGraphSource` (feature = `"osm"` only) |
//! | [`error`]      | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag  | Effect                                             |
//! |-------|----------------------------------------------------|
//! | `osm` | Enables OSM PBF graph construction via `osmpbf`.   |

pub mod cache;
pub mod engine;
pub mod error;
pub mod index;
pub mod network;
pub mod repository;
pub mod simplify;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use engine::{DijkstraEngine, ShortestPathEngine, ShortestPathTree};
pub use error::{SpatialError, SpatialResult};
pub use index::NearestNodeIndex;
pub use network::{GraphParts, StreetGraph, StreetGraphBuilder};
pub use repository::{area_slug, FnGraphSource, GraphSource, StreetGraphRepository};
