//! Gas price normalizer.

use polars::prelude::*;
use prosumer_primitives::{Latency, TimeIndexer, columns::*};
use prosumer_traits::{FeatureSource, SourceContext, SourceError, SourceKind};
use prosumer_utils::{cast_columns, fill_forward_all};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::ensure_data_block_id;

/// Configuration for the gas price source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasConfig {
    /// Days between the forecast date and availability.
    pub latency: Latency,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self { latency: Latency::days(1) }
    }
}

/// Day-ahead gas prices keyed by `data_block_id`.
#[derive(Debug, Clone)]
pub struct GasSource {
    config: GasConfig,
}

impl GasSource {
    /// Create a new gas source with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GasConfig::default())
    }
}

impl Default for GasSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSource for GasSource {
    type Config = GasConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Gas
    }

    fn required_columns(&self) -> &[&str] {
        &[LOWEST_PRICE_PER_MWH, HIGHEST_PRICE_PER_MWH]
    }

    fn join_keys(&self) -> &[&str] {
        &[DATA_BLOCK_ID]
    }

    fn features(&self, data: DataFrame, ctx: &SourceContext<'_>) -> Result<DataFrame, SourceError> {
        self.validate(&data)?;
        gas_features(data, &ctx.indexer, self.config.latency)
    }
}

/// Index gas prices by availability day and forward fill gaps.
///
/// `data_block_id` is derived from `forecast_date` only when the table does
/// not carry one already, so calling this twice is a no-op for the index.
///
/// # Errors
/// Returns `SourceError` if `forecast_date` is needed but missing or
/// unparseable.
pub fn gas_features(
    mut data: DataFrame,
    indexer: &TimeIndexer,
    latency: Latency,
) -> Result<DataFrame, SourceError> {
    ensure_data_block_id(&mut data, FORECAST_DATE, indexer, latency)?;

    let lf = cast_columns(data.lazy(), &[DATA_BLOCK_ID], &DataType::Int64);
    let out = fill_forward_all(lf).collect()?;

    debug!(rows = out.height(), "gas prices indexed");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use prosumer_primitives::CountyMap;

    use super::*;

    fn raw_gas() -> DataFrame {
        df! {
            "forecast_date" => &["2021-09-01", "2021-09-02", "2021-09-03"],
            "lowest_price_per_mwh" => &[Some(45.23), None, Some(47.0)],
            "highest_price_per_mwh" => &[Some(46.32), Some(53.0), None],
        }
        .unwrap()
    }

    #[test]
    fn gas_config_defaults() {
        assert_eq!(GasConfig::default().latency, Latency::days(1));
    }

    #[test]
    fn gas_assigns_block_with_latency() {
        let out = gas_features(raw_gas(), &TimeIndexer::default(), Latency::days(1)).unwrap();
        let blocks: Vec<i64> =
            out.column(DATA_BLOCK_ID).unwrap().i64().unwrap().into_no_null_iter().collect();
        assert_eq!(blocks, vec![1, 2, 3]);
    }

    #[test]
    fn gas_forward_fills_prices() {
        let out = gas_features(raw_gas(), &TimeIndexer::default(), Latency::days(1)).unwrap();
        let low = out.column(LOWEST_PRICE_PER_MWH).unwrap().f64().unwrap();
        let high = out.column(HIGHEST_PRICE_PER_MWH).unwrap().f64().unwrap();
        assert_eq!(low.get(1), Some(45.23));
        assert_eq!(high.get(2), Some(53.0));
    }

    #[test]
    fn gas_keeps_existing_block_id() {
        let mut data = raw_gas();
        data.with_column(Series::new(DATA_BLOCK_ID.into(), &[10_i32, 11, 12])).unwrap();

        let out = gas_features(data, &TimeIndexer::default(), Latency::days(1)).unwrap();
        let blocks: Vec<i64> =
            out.column(DATA_BLOCK_ID).unwrap().i64().unwrap().into_no_null_iter().collect();
        assert_eq!(blocks, vec![10, 11, 12]);

        let again = gas_features(out.clone(), &TimeIndexer::default(), Latency::days(1)).unwrap();
        assert!(again.equals_missing(&out));
    }

    #[test]
    fn gas_source_requires_price_columns() {
        let data = df! { "forecast_date" => &["2021-09-01"] }.unwrap();
        let counties = CountyMap::default();
        let ctx = SourceContext::new(TimeIndexer::default(), &counties);

        let err = GasSource::new().features(data, &ctx).unwrap_err();
        assert!(err.is_data_error());
        assert!(err.to_string().contains(LOWEST_PRICE_PER_MWH));
    }

    #[test]
    fn gas_source_bad_date_is_parse_error() {
        let data = df! {
            "forecast_date" => &["2021-09-01", "tomorrow"],
            "lowest_price_per_mwh" => &[1.0, 2.0],
            "highest_price_per_mwh" => &[1.0, 2.0],
        }
        .unwrap();
        let counties = CountyMap::default();
        let ctx = SourceContext::new(TimeIndexer::default(), &counties);

        let err = GasSource::new().features(data, &ctx).unwrap_err();
        assert!(err.to_string().contains("tomorrow"));
    }
}
