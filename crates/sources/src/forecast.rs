//! Forecast weather aggregation.

use polars::prelude::*;
use prosumer_primitives::{Latency, columns::*};
use prosumer_traits::{FeatureSource, SourceContext, SourceError, SourceKind};
use prosumer_utils::{fill_forward, index_series, index_values, numeric_columns, timestamps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::county_ids;

const IDENTIFIERS: [&str; 8] = [
    TIME_ID,
    COUNTY,
    LATITUDE,
    LONGITUDE,
    DATA_BLOCK_ID,
    HOURS_AHEAD,
    ORIGIN_DATETIME,
    FORECAST_DATETIME,
];

/// Configuration for the forecast weather source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWeatherConfig {
    /// Days added to the forecast valid time. Forecasts are published
    /// ahead of time, so this is normally zero.
    pub latency: Latency,
    /// Prefix for per-county aggregated columns.
    pub prefix: String,
    /// Prefix for county-independent aggregated columns.
    pub global_prefix: String,
}

impl Default for ForecastWeatherConfig {
    fn default() -> Self {
        Self {
            latency: Latency::NONE,
            prefix: "forecast_".to_string(),
            global_prefix: "forecast_global_".to_string(),
        }
    }
}

/// Forecast weather averaged per (time_id, county), with the
/// county-independent average per time_id attached.
#[derive(Debug, Clone)]
pub struct ForecastWeatherSource {
    config: ForecastWeatherConfig,
}

impl ForecastWeatherSource {
    /// Create a new forecast weather source with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ForecastWeatherConfig::default())
    }
}

impl Default for ForecastWeatherSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSource for ForecastWeatherSource {
    type Config = ForecastWeatherConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn kind(&self) -> SourceKind {
        SourceKind::ForecastWeather
    }

    fn required_columns(&self) -> &[&str] {
        &[FORECAST_DATETIME, LATITUDE, LONGITUDE]
    }

    fn join_keys(&self) -> &[&str] {
        &WEATHER_KEYS
    }

    fn features(
        &self,
        mut data: DataFrame,
        ctx: &SourceContext<'_>,
    ) -> Result<DataFrame, SourceError> {
        self.validate(&data)?;
        if self.config.prefix == self.config.global_prefix {
            return Err(SourceError::InvalidConfig(format!(
                "county and global forecast prefixes are both {:?}",
                self.config.prefix
            )));
        }

        let measurements = numeric_columns(&data, &IDENTIFIERS);
        let counties = county_ids(&data, ctx.counties)?;

        let stamps = timestamps(&data, FORECAST_DATETIME)?;
        let latency = self.config.latency;
        let time_ids =
            index_values(&stamps, |ts| ctx.indexer.time_id_with_latency(ts, latency).0);

        data.with_column(index_series(COUNTY, counties))?;
        data.with_column(index_series(TIME_ID, time_ids))?;

        // Every grid point, mapped or not.
        let global_cols = prefixed(&measurements, &self.config.global_prefix);
        let global = data
            .clone()
            .lazy()
            .group_by([col(TIME_ID)])
            .agg(mean_exprs(&measurements, &global_cols));
        let global = fill_forward(global, &global_cols, &[TIME_ID], None);

        let county_cols = prefixed(&measurements, &self.config.prefix);
        let by_county = data
            .lazy()
            .filter(col(COUNTY).is_not_null())
            .group_by([col(TIME_ID), col(COUNTY)])
            .agg(mean_exprs(&measurements, &county_cols));
        let by_county = fill_forward(by_county, &county_cols, &[COUNTY, TIME_ID], Some(COUNTY));

        let out = by_county
            .join(global, [col(TIME_ID)], [col(TIME_ID)], JoinArgs::new(JoinType::Left))
            .sort([TIME_ID, COUNTY], SortMultipleOptions::default())
            .collect()?;

        debug!(rows = out.height(), columns = measurements.len(), "forecast weather aggregated");
        Ok(out)
    }
}

fn prefixed(columns: &[String], prefix: &str) -> Vec<String> {
    columns.iter().map(|c| format!("{prefix}{c}")).collect()
}

fn mean_exprs(columns: &[String], outputs: &[String]) -> Vec<Expr> {
    columns
        .iter()
        .zip(outputs)
        .map(|(c, out)| col(c.as_str()).cast(DataType::Float64).mean().alias(out.as_str()))
        .collect()
}
