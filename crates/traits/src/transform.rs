//! Lag transformation trait definitions.

use polars::prelude::*;

use crate::SourceError;

/// Time shift of a time-indexed table.
///
/// The produced table carries `time_id + lag`, so a left join on `time_id`
/// hands a base row at hour `T` the value recorded at `T - lag`. Negative
/// lags look forward.
pub trait LagTransform: Send + Sync {
    /// Signed shift in hours.
    fn lag(&self) -> i64;

    /// Columns that keep their name after the shift.
    fn key_columns(&self) -> &[&str];

    /// Name of a shifted value column.
    fn lagged_name(&self, column: &str) -> String {
        format!("{column}_{}", self.lag())
    }

    /// Shift `table`, leaving it untouched.
    ///
    /// # Errors
    /// Returns `SourceError` if a required column is missing.
    fn apply(&self, table: &DataFrame) -> Result<LazyFrame, SourceError>;
}
