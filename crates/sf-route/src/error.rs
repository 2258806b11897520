//! Route pipeline errors.

use thiserror::Error;

use sf_catalog::CatalogError;
use sf_core::NodeId;
use sf_geocode::GeocodeError;
use sf_spatial::SpatialError;

/// Failure of one route computation.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("address {address:?} could not be resolved")]
    AddressNotFound {
        address: String,
        #[source]
        source:  GeocodeError,
    },

    #[error("street graph for {area:?} could not be loaded")]
    GraphLoadFailure {
        area:   String,
        #[source]
        source: SpatialError,
    },

    #[error("no destinations between {min_km} and {max_km} km of the address")]
    NoCandidateDestinations { min_km: f64, max_km: f64 },

    #[error("destination catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// No candidate has a finite network distance.  Absorbed by the
    /// straight-line fallback inside the pipeline.
    #[error("no candidate destination is reachable over the street graph")]
    NoReachableDestination,

    /// The nearest candidate is the start node itself.  Also absorbed by the
    /// fallback.
    #[error("route to {node} has fewer than two points")]
    DegeneratePath { node: NodeId },

    #[error("shortest-path search failed: {0}")]
    Search(#[source] SpatialError),

    #[error("predecessor chain to {node} is broken")]
    BrokenPath { node: NodeId },

    #[error("path to {node} sums to {edge_sum_m} m but the search reported {reported_m} m")]
    InconsistentPath {
        node:       NodeId,
        edge_sum_m: f64,
        reported_m: f64,
    },
}

pub type RouteResult<T> = Result<T, RouteError>;

/// What the UI tells the user.  Internal details never leave the pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The address could not be resolved.
    Address,
    /// Nothing to route to near the address.
    NoResults,
    /// Anything else.
    Routing,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::Address   => "address not found",
            Self::NoResults => "no shelters found nearby",
            Self::Routing   => "could not build a route",
        }
    }
}

impl RouteError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AddressNotFound { .. } => FailureKind::Address,
            Self::NoCandidateDestinations { .. } => FailureKind::NoResults,
            _ => FailureKind::Routing,
        }
    }

    /// `true` for outcomes the straight-line fallback replaces.
    pub fn is_fallback_trigger(&self) -> bool {
        matches!(self, Self::NoReachableDestination | Self::DegeneratePath { .. })
    }
}
