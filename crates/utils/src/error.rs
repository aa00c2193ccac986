//! Error types for utility functions.

/// Errors that can occur during utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A value could not be read as a timestamp.
    #[error("cannot parse {value:?} in column {column} as a timestamp")]
    Parse {
        /// Column holding the value.
        column: String,
        /// Offending value.
        value: String,
    },

    /// Column dtype cannot hold timestamps.
    #[error("column {column} has unsupported type {dtype} for timestamps")]
    UnsupportedType {
        /// Column name.
        column: String,
        /// Actual dtype.
        dtype: String,
    },
}
