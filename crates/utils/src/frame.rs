//! Schema helpers for data frames.

use polars::prelude::*;

use crate::UtilsError;

/// Check whether `df` has a column called `name`.
#[must_use]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Fail with [`UtilsError::MissingColumn`] on the first absent column.
///
/// # Errors
/// Returns `UtilsError::MissingColumn` naming the first missing column.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), UtilsError> {
    match columns.iter().find(|name| !has_column(df, name)) {
        Some(missing) => Err(UtilsError::MissingColumn((*missing).to_string())),
        None => Ok(()),
    }
}

/// Whether a dtype can be averaged.
#[must_use]
pub fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_float() || dtype.is_integer() || matches!(dtype, DataType::Boolean)
}

/// Names of numeric columns, in frame order, skipping `exclude`.
#[must_use]
pub fn numeric_columns(df: &DataFrame, exclude: &[&str]) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric(c.dtype()) && !exclude.contains(&c.name().as_str()))
        .map(|c| c.name().to_string())
        .collect()
}

/// Names of all columns, in frame order.
#[must_use]
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// Cast the given columns to `dtype`, leaving the rest untouched.
pub fn cast_columns(df: LazyFrame, columns: &[&str], dtype: &DataType) -> LazyFrame {
    let exprs: Vec<Expr> = columns.iter().map(|&c| col(c).cast(dtype.clone())).collect();
    df.with_columns(exprs)
}

/// Rename every column not listed in `keep` using `rename`.
///
/// Column order is preserved. The frame is not modified; the result is a
/// new lazy projection.
pub fn rename_columns<F>(df: &DataFrame, keep: &[&str], rename: F) -> LazyFrame
where
    F: Fn(&str) -> String,
{
    let exprs: Vec<Expr> = df
        .get_column_names()
        .iter()
        .map(|name| {
            let name = name.as_str();
            if keep.contains(&name) { col(name) } else { col(name).alias(rename(name)) }
        })
        .collect();

    df.clone().lazy().select(exprs)
}
