//! `sf-geocode`: turning a free-text address into a coordinate.
//!
//! # Crate layout
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`geocoder`]     | `Geocoder` trait (the external lookup seam)           |
//! | [`nominatim`]    | `NominatimGeocoder`, `NominatimConfig`                |
//! | [`resolver`]     | `AddressResolver`, `qualify_address`                  |
//! | [`test_support`] | `StaticGeocoder` deterministic double                 |
//! | [`error`]        | `GeocodeError`, `GeocodeResult<T>`                    |
//!
//! Absence of a match is a value (`Ok(None)` from a [`Geocoder`]); the
//! [`AddressResolver`] turns it into [`GeocodeError::NotFound`].

pub mod error;
pub mod geocoder;
pub mod nominatim;
pub mod resolver;
pub mod test_support;


pub use error::{GeocodeError, GeocodeResult, NominatimBuildError};
pub use geocoder::Geocoder;
pub use nominatim::{NominatimConfig, NominatimGeocoder};
pub use resolver::{qualify_address, AddressResolver};
