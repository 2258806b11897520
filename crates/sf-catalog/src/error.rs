//! Catalog error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("destination catalog has no column {column:?}")]
    MissingColumn { column: String },

    #[error("destination catalog could not be read: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
