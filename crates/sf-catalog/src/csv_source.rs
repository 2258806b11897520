//! CSV destination catalog.
//!
//! # CSV format
//!
//! Columns are located by header name, so order and extra columns do not
//! matter.  With the default [`CatalogSchema`]:
//!
//! ```csv
//! id,street,building_number,latitude,longitude,capacity
//! 1,Городоцька,5,49.8383,24.0232,120
//! 2,Шевченка,12А,49.8421,24.0305,
//! 3,Зелена,1,,
//! ```
//!
//! Row 3 has no coordinates and is skipped.  The destination name is the
//! non-empty name columns joined by a space (`"Городоцька 5"`); a row whose
//! name columns are all empty is named after its coordinate.
//!
//! Rows of any width are accepted.  Coordinates written with a decimal
//! comma (`49,8383`) are read as well.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};

use sf_core::GeoPoint;

use crate::{CatalogError, CatalogResult, Destination, DestinationSource, ScanStats};

// ── Schema ────────────────────────────────────────────────────────────────────

/// Header names the catalog reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogSchema {
    pub name_columns:     Vec<String>,
    pub latitude_column:  String,
    pub longitude_column: String,
}

impl Default for CatalogSchema {
    fn default() -> Self {
        Self {
            name_columns:     vec!["street".to_owned(), "building_number".to_owned()],
            latitude_column:  "latitude".to_owned(),
            longitude_column: "longitude".to_owned(),
        }
    }
}

struct ColumnIndex {
    name: Vec<usize>,
    lat:  usize,
    lon:  usize,
}

impl CatalogSchema {
    fn locate(&self, headers: &StringRecord) -> CatalogResult<ColumnIndex> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| CatalogError::MissingColumn { column: column.to_owned() })
        };
        Ok(ColumnIndex {
            name: self.name_columns.iter().map(|c| find(c)).collect::<CatalogResult<_>>()?,
            lat:  find(&self.latitude_column)?,
            lon:  find(&self.longitude_column)?,
        })
    }
}

// ── Source ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Origin {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// [`DestinationSource`] over CSV text, read afresh on every scan.
#[derive(Clone, Debug)]
pub struct CsvDestinationSource {
    origin: Origin,
    schema: CatalogSchema,
}

impl CsvDestinationSource {
    /// Catalog stored in the file at `path`.  The file is opened on each scan.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { origin: Origin::Path(path.into()), schema: CatalogSchema::default() }
    }

    /// Catalog held in memory, e.g. an uploaded file's contents.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { origin: Origin::Bytes(bytes.into()), schema: CatalogSchema::default() }
    }

    /// Read all of `reader` into an in-memory catalog.
    pub fn from_reader<R: Read>(mut reader: R) -> CatalogResult<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn with_schema(mut self, schema: CatalogSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::Path(p) => Some(p),
            Origin::Bytes(_) => None,
        }
    }

    fn scan_reader<R: Read>(
        &self,
        reader: R,
        visit: &mut dyn FnMut(Destination),
    ) -> CatalogResult<ScanStats> {
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let columns = self.schema.locate(csv_reader.headers()?)?;

        let mut stats = ScanStats::default();
        let mut record = StringRecord::new();
        loop {
            match csv_reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    log::debug!("skipping unreadable catalog row: {e}");
                    stats.skipped += 1;
                    continue;
                }
            }

            let Some(point) = record_point(&record, &columns) else {
                log::debug!(
                    "skipping catalog row {} without usable coordinates",
                    record.position().map_or(0, |p| p.line())
                );
                stats.skipped += 1;
                continue;
            };
            visit(Destination { name: record_name(&record, &columns, point), point });
            stats.yielded += 1;
        }
        Ok(stats)
    }
}

impl DestinationSource for CsvDestinationSource {
    fn scan(&self, visit: &mut dyn FnMut(Destination)) -> CatalogResult<ScanStats> {
        match &self.origin {
            Origin::Path(path) => self.scan_reader(File::open(path)?, visit),
            Origin::Bytes(bytes) => self.scan_reader(bytes.as_slice(), visit),
        }
    }
}

// ── Field parsing ─────────────────────────────────────────────────────────────

fn record_point(record: &StringRecord, columns: &ColumnIndex) -> Option<GeoPoint> {
    let lat = parse_coordinate(record.get(columns.lat)?)?;
    let lon = parse_coordinate(record.get(columns.lon)?)?;
    Some(GeoPoint::new(lat, lon)).filter(|p| p.is_valid())
}

fn parse_coordinate(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    field
        .parse::<f64>()
        .ok()
        .or_else(|| field.replacen(',', ".", 1).parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn record_name(record: &StringRecord, columns: &ColumnIndex, point: GeoPoint) -> String {
    let parts: Vec<&str> = columns
        .name
        .iter()
        .filter_map(|&i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        point.to_string()
    } else {
        parts.join(" ")
    }
}
