//! Electricity price normalizer.

use chrono::Timelike;
use polars::prelude::*;
use prosumer_primitives::{DataBlockId, Latency, TimeIndexer, columns::*};
use prosumer_traits::{FeatureSource, SourceContext, SourceError, SourceKind};
use prosumer_utils::{fill_forward_all, index_series, timestamps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::ensure_data_block_id;

/// Configuration for the electricity price source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricityConfig {
    /// Days between the forecast date and availability.
    pub latency: Latency,
}

impl Default for ElectricityConfig {
    fn default() -> Self {
        Self { latency: Latency::days(1) }
    }
}

/// Hourly electricity prices keyed by `time_id`.
#[derive(Debug, Clone)]
pub struct ElectricitySource {
    config: ElectricityConfig,
}

impl ElectricitySource {
    /// Create a new electricity source with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ElectricityConfig::default())
    }
}

impl Default for ElectricitySource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSource for ElectricitySource {
    type Config = ElectricityConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Electricity
    }

    fn required_columns(&self) -> &[&str] {
        &[FORECAST_DATE, EUROS_PER_MWH]
    }

    fn join_keys(&self) -> &[&str] {
        &[TIME_ID]
    }

    fn features(&self, data: DataFrame, ctx: &SourceContext<'_>) -> Result<DataFrame, SourceError> {
        self.validate(&data)?;
        electricity_features(data, &ctx.indexer, self.config.latency)
    }
}

/// Index electricity prices by the hour they become usable.
///
/// `time_id` is `data_block_id * 24 + hour(forecast_date)`, where the block
/// already includes the latency. The block column is dropped afterwards.
///
/// # Errors
/// Returns `SourceError` if `forecast_date` is missing or unparseable.
pub fn electricity_features(
    mut data: DataFrame,
    indexer: &TimeIndexer,
    latency: Latency,
) -> Result<DataFrame, SourceError> {
    ensure_data_block_id(&mut data, FORECAST_DATE, indexer, latency)?;

    let stamps = timestamps(&data, FORECAST_DATE)?;
    let blocks = data.column(DATA_BLOCK_ID)?.cast(&DataType::Int64)?;
    let time_ids: Vec<Option<i64>> = blocks
        .i64()?
        .into_iter()
        .zip(&stamps)
        .map(|(block, ts)| match (block, ts) {
            (Some(block), Some(ts)) => Some(DataBlockId::new(block).hour(ts.hour()).0),
            _ => None,
        })
        .collect();
    data.with_column(index_series(TIME_ID, time_ids))?;

    let lf = data.lazy().drop([DATA_BLOCK_ID]);
    let out = fill_forward_all(lf).collect()?;

    debug!(rows = out.height(), "electricity prices indexed");
    Ok(out)
}
