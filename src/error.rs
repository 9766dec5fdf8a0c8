//! Error types for the query engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for query engine operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Main error type for the query engine
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Failed to read table {}: {source}", path.display())]
    TableLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid numeric value {value:?} in column {column}")]
    NumericParse { column: &'static str, value: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rayon::ThreadPoolBuildError> for QueryError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        QueryError::ThreadPool(e.to_string())
    }
}
