//! Core error type.
//!
//! Sub-crates define their own error enums; `CoreError` only covers
//! configuration handling and value parsing done in this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration value for `{field}`: {reason}")]
    InvalidConfig {
        field:  &'static str,
        reason: String,
    },

    #[error("configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
