//! Error types for rule_explain

use polars::prelude::PolarsError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("feature '{0}' not found in dataset")]
    FeatureNotFound(String),

    #[error("value '{value}' not found for feature '{feature}'")]
    ValueNotFound { feature: String, value: String },

    #[error("illegal combination: {0}")]
    IllegalCombination(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("row {row} out of range for {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("column '{column}' has {found} rows, expected {expected}")]
    ShapeMismatch {
        column: String,
        found: usize,
        expected: usize,
    },

    #[error("dataframe error: {0}")]
    DataFrame(#[from] PolarsError),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn value_not_found(feature: &str, value: impl ToString) -> Self {
        Error::ValueNotFound {
            feature: feature.to_string(),
            value: value.to_string(),
        }
    }
}
