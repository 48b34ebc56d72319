//! Error handling for cohort loading and analysis.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Specialized error type for the cohort pipeline
#[derive(Debug, Error)]
pub enum CohortError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Error decoding Parquet data
    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),

    /// Error in an Arrow compute kernel or batch construction
    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),

    /// Error converting between record batches and typed records
    #[error("Record conversion error: {0}")]
    SerdeArrowError(#[from] serde_arrow::Error),

    /// Error writing a JSON report
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error retrieving a remote partition file
    #[error("HTTP error fetching {url}: {source}")]
    HttpError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Partition schemas cannot be combined
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// A column required by an operation is absent
    #[error("Column {column} not found in {table} table")]
    MissingColumn { table: String, column: String },

    /// A lab value could not be converted to a number
    #[error("Cannot convert value {value:?} at row {row} to a number")]
    ValueConversion { row: usize, value: String },

    /// A two-sample test was given an empty sample
    #[error("Two-sample test needs non-empty samples (got {left} and {right} values)")]
    EmptySample { left: usize, right: usize },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CohortError {
    /// Shorthand for a [`CohortError::MissingColumn`]
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Result type for cohort operations
pub type Result<T> = std::result::Result<T, CohortError>;
