//! `sf-catalog`: candidate destinations (shelters) and the radius filter.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                 |
//! |------------------|----------------------------------------------------------|
//! | [`destination`]  | `Destination`, `DestinationSource` trait, `ScanStats`    |
//! | [`csv_source`]   | `CsvDestinationSource`, `CatalogSchema`                  |
//! | [`filter`]       | `candidates_near`                                        |
//! | [`error`]        | `CatalogError`, `CatalogResult<T>`                       |
//!
//! Records are streamed, never cached: every route computation scans its
//! source afresh.

pub mod csv_source;
pub mod destination;
pub mod error;
pub mod filter;


pub use csv_source::{CatalogSchema, CsvDestinationSource};
pub use destination::{Destination, DestinationSource, ScanStats};
pub use error::{CatalogError, CatalogResult};
pub use filter::candidates_near;
