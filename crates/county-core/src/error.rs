//! Error types for the county pipeline.

use county_ingest::IngestError;
use county_model::{AggregateShapeError, FeatureShapeError, ModelError};
use thiserror::Error;

/// Errors that abort a pipeline computation.
///
/// Unmatched labels, unresolvable boundary names, thin groups and empty joins
/// are not errors; they show up as missing values, [`county_model::Resolution::Unresolvable`],
/// omitted rows and empty tables respectively.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Input Errors ===
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A column the computation reads is absent from the frame.
    #[error("required column '{column}' not found")]
    MissingColumn { column: String },

    // === Configuration Errors ===
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The county prefix pattern failed to compile.
    #[error("invalid county prefix pattern: {0}")]
    Pattern(#[from] regex::Error),

    // === Merge Errors ===
    /// A merge or statistic names a column the table does not have.
    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    /// More than one population row survived the filters for a county.
    #[error(
        "{rows} population rows for county '{county}' after filtering; add a `filters` entry that selects one row per county"
    )]
    DuplicatePopulation { county: String, rows: usize },

    /// A merge was requested without any source aggregate.
    #[error("merge requires at least one source aggregate")]
    NoMergeSources,

    // === Shape Errors ===
    #[error("aggregate shape: {0}")]
    AggregateShape(#[from] AggregateShapeError),

    #[error("feature table shape: {0}")]
    FeatureShape(#[from] FeatureShapeError),

    // === DataFrame Errors ===
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for CoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Fail with [`CoreError::MissingColumn`] unless `df` has `column`.
pub(crate) fn ensure_column(df: &polars::prelude::DataFrame, column: &str) -> Result<()> {
    if df.get_column_names().iter().any(|name| name.as_str() == column) {
        Ok(())
    } else {
        Err(CoreError::MissingColumn {
            column: column.to_string(),
        })
    }
}
