//! Error types for the datagenius library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for datagenius operations.
#[derive(Debug, Error)]
pub enum GeniusError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error (configs, plans, schemas, name patterns).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Empty file or no data to work with.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A column referenced by a transmutation or guide does not exist.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Positional access outside of a header or row.
    #[error("{index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Header label lookup failed.
    #[error("{0} not in Header.")]
    LabelNotFound(String),

    /// A cleaning, redistribution or supplement guide is malformed.
    #[error("Invalid guide: {0}")]
    InvalidGuide(String),

    /// A value could not be interpreted as a number.
    #[error("Not numeric: {0}")]
    NotNumeric(String),

    /// A transmutation failed while running.
    #[error("Transmutation '{name}' failed: {message}")]
    Transmutation { name: String, message: String },
}

impl GeniusError {
    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeniusError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for datagenius operations.
pub type Result<T> = std::result::Result<T, GeniusError>;
