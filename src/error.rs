use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Ingestion errors
// ---------------------------------------------------------------------------

/// Failure to turn an upload into a [`Dataset`](crate::data::model::Dataset).
///
/// These never abort the app: the state layer shows them as an error banner
/// and continues with an empty dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no columns to parse from file")]
    NoColumns,

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("workbook contains no worksheet")]
    NoWorksheet,

    #[error("parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON: {0}")]
    JsonShape(String),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },
}

// ---------------------------------------------------------------------------
// Numeric coercion errors
// ---------------------------------------------------------------------------

/// Failure to derive a numeric view / average for a column.
/// Surfaced as a warning; the average is simply omitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("column '{0}' has no numeric values")]
    NoNumericValues(String),
}

// ---------------------------------------------------------------------------
// Chart errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),
}
