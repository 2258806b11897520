//! `sf-core`: foundational types for the `shelter_finder` workspace.
//!
//! Every other `sf-*` crate depends on this one.  It has no `sf-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`                                    |
//! | [`geo`]         | `GeoPoint`, geodesic distance                         |
//! | [`network`]     | `NetworkType` (walk / drive)                          |
//! | [`config`]      | `RouteConfig`, `RadiusBand`                           |
//! | [`error`]       | `CoreError`, `CoreResult`                             |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod network;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{RadiusBand, RouteConfig};
pub use error::{CoreError, CoreResult};
pub use crate::geo::GeoPoint;
pub use ids::{EdgeId, NodeId};
pub use network::NetworkType;
