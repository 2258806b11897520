//! Destination records and the streaming source trait.

use serde::{Deserialize, Serialize};

use sf_core::GeoPoint;

use crate::CatalogResult;

/// A candidate destination.
///
/// Not deduplicated: two records with the same name and different
/// coordinates are two destinations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name:  String,
    pub point: GeoPoint,
}

impl Destination {
    pub fn new(name: impl Into<String>, point: GeoPoint) -> Self {
        Self { name: name.into(), point }
    }
}

/// Outcome counts of one [`DestinationSource::scan`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Records handed to the visitor.
    pub yielded: usize,
    /// Records dropped for missing or unusable coordinates.
    pub skipped: usize,
}

/// A stream of destination records.
///
/// `scan` visits every usable record in source order.  It may be called
/// any number of times; each call reads the source afresh.
pub trait DestinationSource {
    fn scan(&self, visit: &mut dyn FnMut(Destination)) -> CatalogResult<ScanStats>;
}

impl DestinationSource for [Destination] {
    fn scan(&self, visit: &mut dyn FnMut(Destination)) -> CatalogResult<ScanStats> {
        let mut stats = ScanStats::default();
        for d in self {
            if d.point.is_valid() {
                visit(d.clone());
                stats.yielded += 1;
            } else {
                stats.skipped += 1;
            }
        }
        Ok(stats)
    }
}

impl DestinationSource for Vec<Destination> {
    fn scan(&self, visit: &mut dyn FnMut(Destination)) -> CatalogResult<ScanStats> {
        self.as_slice().scan(visit)
    }
}
