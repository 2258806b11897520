//! `sf-route`: from an address to the route to the nearest destination.
//!
//! # Pipeline
//!
//! ```text
//! address ──▶ AddressResolver ──▶ candidates_near ──▶ StreetGraphRepository
//!                                                          │
//!   PathResult ◀── RouteAssembler ◀── ShortestPathEngine ◀─┘ (snap user + candidates)
//! ```
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`planner`]     | `RoutePlanner`, the whole pipeline                     |
//! | [`assembler`]   | `RouteAssembler`, `Candidate`, minute estimation        |
//! | [`result`]      | `PathResult`, `RouteKind`                               |
//! | [`error`]       | `RouteError`, `FailureKind`, `RouteResult<T>`           |
//!
//! When no candidate is reachable over the street graph, the pipeline falls
//! back to a straight line to the geodesically nearest candidate.

pub mod assembler;
pub mod error;
pub mod planner;
pub mod result;


pub use assembler::{estimate_minutes, Candidate, RouteAssembler};
pub use error::{FailureKind, RouteError, RouteResult};
pub use planner::RoutePlanner;
pub use result::{PathResult, RouteKind};
