use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors returned while loading and preparing a listings table.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("row {row}: unparseable date_posted value {value:?}")]
    UnparseableDate { row: usize, value: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid locator: {0}")]
    InvalidLocator(String),

    #[error("unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("test fraction must be within (0, 1), got {0}")]
    InvalidSplit(f64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("s3 error: {0}")]
    S3(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PrepError>;
