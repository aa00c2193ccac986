//! Time-shifted copies of the target and forecast weather tables.

use polars::prelude::*;
use prosumer_primitives::columns::*;
use prosumer_traits::{LagTransform, SourceError};
use prosumer_utils::{rename_columns, require_columns};

/// Target lags in hours, in join order.
///
/// The smallest is 48: a target becomes known two days after the hour it
/// describes.
pub const TARGET_LAGS: [i64; 10] = [48, 49, 50, 72, 96, 120, 144, 168, 336, 504];

/// Forecast weather lags in hours. `-1` looks one hour ahead.
pub const FORECAST_LAGS: [i64; 2] = [-1, 1];

/// Rows with a `time_id` below this are dropped from the final table.
pub const MIN_TIME_ID: i64 = 48;

/// Shift of the per-county forecast weather table.
///
/// Keeps `time_id` and `county` and renames every other column to
/// `{name}_{lag}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastLag {
    lag: i64,
}

impl ForecastLag {
    /// Create a forecast lag of `lag` hours.
    #[must_use]
    pub const fn new(lag: i64) -> Self {
        Self { lag }
    }
}

impl LagTransform for ForecastLag {
    fn lag(&self) -> i64 {
        self.lag
    }

    fn key_columns(&self) -> &[&str] {
        &WEATHER_KEYS
    }

    fn apply(&self, table: &DataFrame) -> Result<LazyFrame, SourceError> {
        require_columns(table, self.key_columns())?;

        let shifted = rename_columns(table, self.key_columns(), |name| self.lagged_name(name))
            .with_column(col(TIME_ID) + lit(self.lag));
        Ok(shifted)
    }
}

/// Shift of the target history.
///
/// Projects the target keys and `target`, moves `time_id` forward by the
/// lag and renames the value to `target_{lag}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLag {
    lag: i64,
}

impl TargetLag {
    /// Create a target lag of `lag` hours.
    #[must_use]
    pub const fn new(lag: i64) -> Self {
        Self { lag }
    }
}

impl LagTransform for TargetLag {
    fn lag(&self) -> i64 {
        self.lag
    }

    fn key_columns(&self) -> &[&str] {
        &TARGET_KEYS
    }

    fn apply(&self, table: &DataFrame) -> Result<LazyFrame, SourceError> {
        require_columns(table, self.key_columns())?;
        require_columns(table, &[TARGET])?;

        let mut exprs: Vec<Expr> = self.key_columns().iter().map(|&k| col(k)).collect();
        exprs.push(col(TARGET).cast(DataType::Float64).alias(self.lagged_name(TARGET)));

        let shifted = table
            .clone()
            .lazy()
            .select(exprs)
            .with_column(col(TIME_ID) + lit(self.lag));
        Ok(shifted)
    }
}

/// Forecast weather shifted by `lag` hours.
///
/// # Errors
/// Returns `SourceError` if `time_id` or `county` is missing.
pub fn create_forecast_lag(forecast: &DataFrame, lag: i64) -> Result<DataFrame, SourceError> {
    Ok(ForecastLag::new(lag).apply(forecast)?.collect()?)
}

/// Target history shifted by `lag` hours.
///
/// # Errors
/// Returns `SourceError` if a target key or `target` is missing.
pub fn create_target_lag(targets: &DataFrame, lag: i64) -> Result<DataFrame, SourceError> {
    Ok(TargetLag::new(lag).apply(targets)?.collect()?)
}
