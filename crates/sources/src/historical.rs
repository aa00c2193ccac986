//! Historical weather aggregation onto the county grid.

use chrono::TimeDelta;
use polars::prelude::*;
use prosumer_primitives::{Latency, columns::*};
use prosumer_traits::{FeatureSource, SourceContext, SourceError, SourceKind};
use prosumer_utils::{fill_forward, index_series, index_values, numeric_columns, timestamps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::county_ids;

/// Columns identifying a raw observation rather than measuring weather.
const IDENTIFIERS: [&str; 6] = [TIME_ID, COUNTY, LATITUDE, LONGITUDE, DATA_BLOCK_ID, DATETIME];

/// Configuration for the historical weather source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalWeatherConfig {
    /// Days between the observation and availability.
    pub latency: Latency,
    /// Hours subtracted before taking the observation's day.
    pub back_shift_hours: i64,
    /// Prefix for aggregated weather columns.
    pub prefix: String,
}

impl Default for HistoricalWeatherConfig {
    fn default() -> Self {
        Self { latency: Latency::days(2), back_shift_hours: 11, prefix: "historical_".to_string() }
    }
}

/// Observed weather averaged per (time_id, county).
#[derive(Debug, Clone)]
pub struct HistoricalWeatherSource {
    config: HistoricalWeatherConfig,
}

impl HistoricalWeatherSource {
    /// Create a new historical weather source with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HistoricalWeatherConfig::default())
    }
}

impl Default for HistoricalWeatherSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSource for HistoricalWeatherSource {
    type Config = HistoricalWeatherConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn kind(&self) -> SourceKind {
        SourceKind::HistoricalWeather
    }

    fn required_columns(&self) -> &[&str] {
        &[DATETIME, LATITUDE, LONGITUDE]
    }

    fn join_keys(&self) -> &[&str] {
        &WEATHER_KEYS
    }

    /// Map observations to counties and average them per hour.
    ///
    /// Rows whose rounded coordinate is not in the county map are dropped.
    /// Observations are reported late and labelled for the following local
    /// day: the index uses the day of `datetime - back_shift_hours` plus the
    /// latency, and the hour of `datetime`.
    fn features(
        &self,
        mut data: DataFrame,
        ctx: &SourceContext<'_>,
    ) -> Result<DataFrame, SourceError> {
        self.validate(&data)?;

        let measurements = numeric_columns(&data, &IDENTIFIERS);
        let counties = county_ids(&data, ctx.counties)?;

        let stamps = timestamps(&data, DATETIME)?;
        let back_shift = TimeDelta::hours(self.config.back_shift_hours);
        let latency = self.config.latency;
        let time_ids = index_values(&stamps, |ts| {
            ctx.indexer.time_id_back_shifted(ts, back_shift, latency).0
        });

        data.with_column(index_series(COUNTY, counties))?;
        data.with_column(index_series(TIME_ID, time_ids))?;

        let prefix = &self.config.prefix;
        let outputs: Vec<String> = measurements.iter().map(|c| format!("{prefix}{c}")).collect();
        let aggs: Vec<Expr> = measurements
            .iter()
            .zip(&outputs)
            .map(|(c, out)| col(c.as_str()).cast(DataType::Float64).mean().alias(out.as_str()))
            .collect();

        let grouped = data
            .lazy()
            .filter(col(COUNTY).is_not_null())
            .group_by([col(TIME_ID), col(COUNTY)])
            .agg(aggs);

        let out = fill_forward(grouped, &outputs, &[COUNTY, TIME_ID], Some(COUNTY))
            .sort([TIME_ID, COUNTY], SortMultipleOptions::default())
            .collect()?;

        debug!(rows = out.height(), columns = outputs.len(), "historical weather aggregated");
        Ok(out)
    }
}
