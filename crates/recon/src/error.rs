use std::path::PathBuf;

use thiserror::Error;

/// Errors from the fallible layers around the engine (config, view queries).
///
/// `reconcile` itself never fails: malformed records are dropped and zero
/// denominators yield zero percentages.
#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty column name, zero page size, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Config file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Unknown tab, sort key, or a page size of zero.
    #[error("invalid view query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, ReconError>;
