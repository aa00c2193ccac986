//! Error types for the feature pipeline.

use polars::error::PolarsError;
use prosumer_traits::SourceError;
use prosumer_utils::UtilsError;

/// Errors that can occur while assembling the feature table.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Error raised by a feature source or lag transform.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Column or timestamp error raised while reading a table.
    #[error(transparent)]
    Utils(#[from] UtilsError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),

    /// A joined fragment would overwrite a column already on the table.
    #[error("{fragment} features collide with existing column {column}")]
    ColumnCollision {
        /// Fragment being joined.
        fragment: String,
        /// Column present on both sides.
        column: String,
    },

    /// The joins produced more rows than the base table had.
    #[error("joins changed the row count from {expected} to {actual}")]
    DuplicateRows {
        /// Base row count.
        expected: usize,
        /// Row count after joining.
        actual: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    /// Missing required column.
    #[must_use]
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::Utils(UtilsError::MissingColumn(name.into()))
    }

    /// Returns whether the failure stems from the input data rather than
    /// the configuration or the engine.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        match self {
            Self::Source(err) => err.is_data_error(),
            Self::Utils(
                UtilsError::MissingColumn(_)
                | UtilsError::Parse { .. }
                | UtilsError::UnsupportedType { .. },
            ) => true,
            Self::DuplicateRows { .. } => true,
            Self::Utils(UtilsError::Polars(_))
            | Self::Polars(_)
            | Self::ColumnCollision { .. }
            | Self::InvalidConfig(_) => false,
        }
    }
}
