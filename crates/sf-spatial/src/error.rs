//! Spatial-subsystem error type.

use std::path::PathBuf;

use thiserror::Error;

use sf_core::NodeId;

/// Errors produced by `sf-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("edge {from} -> {to} references a node outside the graph ({node_count} nodes)")]
    DanglingEdge {
        from:       NodeId,
        to:         NodeId,
        node_count: usize,
    },

    #[error("edge {from} -> {to} has invalid weight {weight} (must be finite and >= 0)")]
    InvalidWeight {
        from:   NodeId,
        to:     NodeId,
        weight: f64,
    },

    #[error("malformed graph layout: {0}")]
    Layout(String),

    #[error("no geodata for place {area:?}")]
    PlaceNotFound { area: String },

    #[error("graph cache {path} is unusable: {reason}")]
    InvalidCache { path: PathBuf, reason: String },

    #[error("graph cache {path} could not be encoded/decoded: {source}")]
    CacheCodec {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
