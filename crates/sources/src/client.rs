//! Client metadata normalizer.

use polars::prelude::*;
use prosumer_primitives::{Latency, TimeIndexer, columns::*};
use prosumer_traits::{FeatureSource, SourceContext, SourceError, SourceKind};
use prosumer_utils::{cast_columns, fill_forward_all};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::ensure_data_block_id;

/// Configuration for the client source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Days between the client snapshot date and availability.
    pub latency: Latency,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { latency: Latency::days(2) }
    }
}

/// Installed capacity and consumption point counts per segment and day.
#[derive(Debug, Clone)]
pub struct ClientSource {
    config: ClientConfig,
}

impl ClientSource {
    /// Create a new client source with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }
}

impl Default for ClientSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSource for ClientSource {
    type Config = ClientConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Client
    }

    fn required_columns(&self) -> &[&str] {
        &[PRODUCT_TYPE, COUNTY, IS_BUSINESS, EIC_COUNT, INSTALLED_CAPACITY]
    }

    fn join_keys(&self) -> &[&str] {
        &CLIENT_KEYS
    }

    fn features(&self, data: DataFrame, ctx: &SourceContext<'_>) -> Result<DataFrame, SourceError> {
        self.validate(&data)?;
        client_features(data, &ctx.indexer, self.config.latency)
    }
}

/// Index client rows by availability day and forward fill gaps.
///
/// # Errors
/// Returns `SourceError` if `date` is needed but missing or unparseable.
pub fn client_features(
    mut data: DataFrame,
    indexer: &TimeIndexer,
    latency: Latency,
) -> Result<DataFrame, SourceError> {
    ensure_data_block_id(&mut data, DATE, indexer, latency)?;

    let lf = cast_columns(data.lazy(), &CLIENT_KEYS, &DataType::Int64);
    let out = fill_forward_all(lf).collect()?;

    debug!(rows = out.height(), "client table indexed");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use prosumer_primitives::CountyMap;

    use super::*;

    fn raw_client() -> DataFrame {
        df! {
            "product_type" => &[1_i32, 2, 3],
            "county" => &[0_i32, 0, 0],
            "eic_count" => &[Some(108.0), Some(17.0), None],
            "installed_capacity" => &[Some(952.89), None, Some(2_861.3)],
            "is_business" => &[false, false, true],
            "date" => &["2021-09-01", "2021-09-01", "2021-09-02"],
        }
        .unwrap()
    }

    #[test]
    fn client_config_defaults() {
        assert_eq!(ClientConfig::default().latency, Latency::days(2));
    }

    #[test]
    fn client_block_uses_two_day_latency() {
        let out = client_features(raw_client(), &TimeIndexer::default(), Latency::days(2)).unwrap();
        let blocks: Vec<i64> =
            out.column(DATA_BLOCK_ID).unwrap().i64().unwrap().into_no_null_iter().collect();
        assert_eq!(blocks, vec![2, 2, 3]);
    }

    #[test]
    fn client_keys_are_int64_and_filled() {
        let out = client_features(raw_client(), &TimeIndexer::default(), Latency::days(2)).unwrap();
        for key in CLIENT_KEYS {
            assert_eq!(out.column(key).unwrap().dtype(), &DataType::Int64);
        }
        assert_eq!(out.column(IS_BUSINESS).unwrap().i64().unwrap().get(2), Some(1));
        assert_eq!(out.column(EIC_COUNT).unwrap().f64().unwrap().get(2), Some(17.0));
        assert_eq!(out.column(INSTALLED_CAPACITY).unwrap().f64().unwrap().get(1), Some(952.89));
    }

    #[test]
    fn client_source_missing_column() {
        let data = raw_client().drop(EIC_COUNT).unwrap();
        let counties = CountyMap::default();
        let ctx = SourceContext::new(TimeIndexer::default(), &counties);

        let err = ClientSource::new().features(data, &ctx).unwrap_err();
        assert_eq!(err.to_string(), "missing column: eic_count");
    }

    #[test]
    fn client_source_missing_date_without_block() {
        let data = raw_client().drop(DATE).unwrap();
        let counties = CountyMap::default();
        let ctx = SourceContext::new(TimeIndexer::default(), &counties);

        let err = ClientSource::new().features(data, &ctx).unwrap_err();
        assert_eq!(err.to_string(), "missing column: date");
    }
}
