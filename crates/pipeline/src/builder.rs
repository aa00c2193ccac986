//! Join orchestration: raw tables in, one feature row per base row out.

use std::collections::HashSet;

use polars::prelude::*;
use prosumer_primitives::{CountyMap, columns::*};
use prosumer_sources::{
    CalendarSource, ClientSource, ElectricitySource, ForecastWeatherSource, GasSource,
    HistoricalWeatherSource, time_features,
};
use prosumer_traits::{FeatureSource, LagTransform, SourceContext};
use prosumer_utils::{has_column, numeric_columns, require_columns};
use tracing::{debug, info, warn};

use crate::{
    BaseTable, FORECAST_LAGS, ForecastLag, MIN_TIME_ID, PipelineConfig, PipelineError,
    TARGET_LAGS, TargetLag, base::ROW_INDEX, create_forecast_lag, create_target_lag,
    index_targets,
};

/// Name of the derived ratio column.
pub const TARGET_RATIO: &str = "target_ratio";

/// Added to the denominator of [`TARGET_RATIO`].
pub const RATIO_EPSILON: f64 = 1e-4;

/// The raw tables consumed by one pipeline run.
#[derive(Debug, Clone)]
pub struct RawTables {
    /// Base rows: `datetime`, the segment keys, optionally `target` and
    /// `data_block_id`.
    pub base: DataFrame,
    /// Client snapshots.
    pub client: DataFrame,
    /// Daily gas prices.
    pub gas: DataFrame,
    /// Hourly electricity prices.
    pub electricity: DataFrame,
    /// Observed weather per grid point.
    pub historical_weather: DataFrame,
    /// Forecast weather per grid point.
    pub forecast_weather: DataFrame,
    /// Separate target history. When absent the base rows are used.
    pub targets: Option<DataFrame>,
}

/// `target_168 / (target_336 + 1e-4)`. Missing operands give a missing
/// ratio.
#[must_use]
pub fn target_ratio() -> Expr {
    (col("target_168") / (col("target_336") + lit(RATIO_EPSILON))).alias(TARGET_RATIO)
}

/// Builds the model-ready feature table.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    config: PipelineConfig,
}

impl FeatureBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a new builder with custom configuration.
    #[must_use]
    pub const fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline.
    ///
    /// Sources are normalized independently, then left-joined onto the
    /// base rows in a fixed order. The result keeps base row order and
    /// holds only rows with `time_id >= 48`.
    ///
    /// # Errors
    /// Returns `PipelineError` on invalid configuration, missing or
    /// unparseable input columns, a column collision between fragments, or
    /// duplicated base rows when `strict_row_count` is set.
    pub fn build(
        &self,
        tables: RawTables,
        counties: &CountyMap,
    ) -> Result<DataFrame, PipelineError> {
        self.config.validate()?;
        info!(
            base_rows = tables.base.height(),
            counties = counties.len(),
            "building feature table"
        );

        let config = &self.config;
        let indexer = config.indexer;
        let ctx = SourceContext::new(indexer, counties);

        let client_source = ClientSource::with_config(config.client.clone());
        let gas_source = GasSource::with_config(config.gas.clone());
        let electricity_source = ElectricitySource::with_config(config.electricity.clone());
        let historical_source =
            HistoricalWeatherSource::with_config(config.historical_weather.clone());
        let forecast_source = ForecastWeatherSource::with_config(config.forecast_weather.clone());
        let calendar_source = CalendarSource::new();

        let client = client_source.features(tables.client, &ctx)?;
        let gas = gas_source.features(tables.gas, &ctx)?;
        let electricity = electricity_source.features(tables.electricity, &ctx)?;

        let base = BaseTable::new(&tables.base, &indexer, config.base_latency)?;

        let historical = historical_source.features(tables.historical_weather, &ctx)?;
        let forecast = forecast_source.features(tables.forecast_weather, &ctx)?;
        let [ahead, behind] = FORECAST_LAGS.map(ForecastLag::new);
        let forecast_ahead = create_forecast_lag(&forecast, ahead.lag())?;
        let forecast_behind = create_forecast_lag(&forecast, behind.lag())?;

        let calendar = time_features(base.timestamps(), &indexer)?;

        let target_source = match &tables.targets {
            Some(targets) => index_targets(targets, &indexer)?,
            None => base.target_source()?,
        };
        let target_lags = TARGET_LAGS
            .iter()
            .map(|&lag| create_target_lag(&target_source, lag).map(|frame| (lag, frame)))
            .collect::<Result<Vec<_>, _>>()?;
        drop(target_source);
        debug!(lags = target_lags.len(), "target lags built");

        let client = if has_column(&client, DATE) { client.drop(DATE)? } else { client };
        let electricity =
            select_values(&electricity, electricity_source.join_keys(), &[EUROS_PER_MWH])?;
        let gas = select_values(
            &gas,
            gas_source.join_keys(),
            &[LOWEST_PRICE_PER_MWH, HIGHEST_PRICE_PER_MWH],
        )?;

        let mut plan = JoinPlan::new(base.rows()).join_source(&client_source, client)?;
        for (lag, frame) in target_lags {
            let lag = TargetLag::new(lag);
            plan = plan.join(&format!("target lag {}", lag.lag()), frame, lag.key_columns())?;
        }
        let plan = plan
            .join_source(&historical_source, historical)?
            .join_source(&forecast_source, forecast)?
            .join_lag(&ahead, forecast_ahead)?
            .join_source(&calendar_source, calendar)?
            .join_source(&electricity_source, electricity)?
            .join_source(&gas_source, gas)?
            .join_lag(&behind, forecast_behind)?;

        let joined = base.attach_target(plan.finish().with_column(target_ratio())).collect()?;
        self.check_row_count(base.height(), joined.height())?;

        let out = joined
            .lazy()
            .filter(col(TIME_ID).gt_eq(lit(MIN_TIME_ID)))
            .sort([ROW_INDEX], SortMultipleOptions::default())
            .drop([ROW_INDEX])
            .collect()?;

        info!(rows = out.height(), columns = out.width(), "feature table built");
        Ok(out)
    }

    /// Numeric model inputs of a built table.
    ///
    /// Drops `time_id`, `data_block_id`, `target` and any `passthrough`
    /// identifiers. Segment keys stay in as categorical features.
    #[must_use]
    pub fn feature_columns(table: &DataFrame, passthrough: &[&str]) -> Vec<String> {
        let mut exclude = vec![TIME_ID, DATA_BLOCK_ID, TARGET];
        exclude.extend_from_slice(passthrough);
        numeric_columns(table, &exclude)
    }

    fn check_row_count(&self, expected: usize, actual: usize) -> Result<(), PipelineError> {
        if expected == actual {
            return Ok(());
        }
        if self.config.strict_row_count {
            return Err(PipelineError::DuplicateRows { expected, actual });
        }
        warn!(expected, actual, "feature joins duplicated base rows");
        Ok(())
    }
}

/// Build the feature table with the default configuration.
///
/// # Errors
/// See [`FeatureBuilder::build`].
pub fn get_features(tables: RawTables, counties: &CountyMap) -> Result<DataFrame, PipelineError> {
    FeatureBuilder::new().build(tables, counties)
}

/// Project a source table to its join keys and the given value columns.
fn select_values(
    features: &DataFrame,
    keys: &[&str],
    values: &[&str],
) -> Result<DataFrame, PipelineError> {
    let columns: Vec<&str> = keys.iter().chain(values).copied().collect();
    Ok(features.select(columns)?)
}

/// Left joins onto the base rows, tracking column names so that no
/// fragment silently shadows another.
struct JoinPlan {
    frame: LazyFrame,
    columns: HashSet<String>,
}

impl JoinPlan {
    fn new(base: &DataFrame) -> Self {
        let columns = base.get_column_names().iter().map(|name| name.to_string()).collect();
        Self { frame: base.clone().lazy(), columns }
    }

    fn join(
        mut self,
        fragment: &str,
        features: DataFrame,
        keys: &[&str],
    ) -> Result<Self, PipelineError> {
        require_columns(&features, keys)?;

        for name in features.get_column_names() {
            let name = name.as_str();
            if keys.contains(&name) {
                continue;
            }
            if !self.columns.insert(name.to_string()) {
                return Err(PipelineError::ColumnCollision {
                    fragment: fragment.to_string(),
                    column: name.to_string(),
                });
            }
        }

        debug!(fragment, rows = features.height(), width = features.width(), "joining features");
        let on: Vec<Expr> = keys.iter().map(|&k| col(k)).collect();
        self.frame =
            self.frame.join(features.lazy(), on.clone(), on, JoinArgs::new(JoinType::Left));
        Ok(self)
    }

    /// Join a source's features on the keys the source declares.
    fn join_source<S: FeatureSource>(
        self,
        source: &S,
        features: DataFrame,
    ) -> Result<Self, PipelineError> {
        self.join(&source.kind().to_string(), features, source.join_keys())
    }

    /// Join a shifted forecast table on the lag's key columns.
    fn join_lag(self, lag: &ForecastLag, features: DataFrame) -> Result<Self, PipelineError> {
        self.join(&format!("forecast lag {}", lag.lag()), features, lag.key_columns())
    }

    fn finish(self) -> LazyFrame {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn counties() -> CountyMap {
        [("57.6_21.7", 0_i64), ("58.5_22.7", 1)].into_iter().collect()
    }

    /// Two counties over hours 48 and 49, plus one early row at hour 5.
    fn raw_base() -> DataFrame {
        df! {
            "county" => &[0_i64, 0, 1, 0, 1],
            "is_business" => &[false; 5],
            "product_type" => &[1_i64; 5],
            "is_consumption" => &[true; 5],
            "target" => &[0.5, 1.0, 2.0, 3.0, 4.0],
            "datetime" => &[
                "2021-09-01 05:00:00",
                "2021-09-03 00:00:00",
                "2021-09-03 00:00:00",
                "2021-09-03 01:00:00",
                "2021-09-03 01:00:00",
            ],
        }
        .unwrap()
    }

    fn tables(base: DataFrame) -> RawTables {
        let client = df! {
            "product_type" => &[1_i64, 1],
            "county" => &[0_i64, 1],
            "eic_count" => &[10.0, 20.0],
            "installed_capacity" => &[100.0, 200.0],
            "is_business" => &[false, false],
            "date" => &["2021-09-01", "2021-09-01"],
        }
        .unwrap();

        let gas = df! {
            "forecast_date" => &["2021-09-02"],
            "lowest_price_per_mwh" => &[45.23],
            "highest_price_per_mwh" => &[46.32],
        }
        .unwrap();

        let electricity = df! {
            "forecast_date" => &["2021-09-02 00:00:00", "2021-09-02 01:00:00"],
            "euros_per_mwh" => &[92.51, 88.9],
        }
        .unwrap();

        let historical_weather = df! {
            "datetime" => &[
                "2021-09-02 00:00:00",
                "2021-09-02 00:00:00",
                "2021-09-02 01:00:00",
                "2021-09-02 01:00:00",
            ],
            "latitude" => &[57.6, 58.5, 57.6, 58.5],
            "longitude" => &[21.7, 22.7, 21.7, 22.7],
            "temperature" => &[14.0, 15.0, 16.0, 17.0],
        }
        .unwrap();

        let forecast_weather = df! {
            "forecast_datetime" => &[
                "2021-09-02 23:00:00",
                "2021-09-03 00:00:00",
                "2021-09-03 00:00:00",
                "2021-09-03 01:00:00",
                "2021-09-03 01:00:00",
                "2021-09-03 02:00:00",
            ],
            "latitude" => &[57.6, 57.6, 58.5, 57.6, 58.5, 57.6],
            "longitude" => &[21.7, 21.7, 22.7, 21.7, 22.7, 21.7],
            "temperature" => &[9.0, 10.0, 20.0, 11.0, 21.0, 12.0],
        }
        .unwrap();

        RawTables {
            base,
            client,
            gas,
            electricity,
            historical_weather,
            forecast_weather,
            targets: None,
        }
    }

    fn build() -> DataFrame {
        get_features(tables(raw_base()), &counties()).unwrap()
    }

    fn i64s(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name).unwrap().i64().unwrap().into_iter().collect()
    }

    fn f64s(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn one_row_per_base_row_after_truncation() {
        let out = build();
        assert_eq!(out.height(), 4);
        assert_eq!(i64s(&out, TIME_ID), vec![Some(48), Some(48), Some(49), Some(49)]);
        assert_eq!(i64s(&out, COUNTY), vec![Some(0), Some(1), Some(0), Some(1)]);
        assert!(out.column(ROW_INDEX).is_err());
    }

    #[test]
    fn client_and_prices_match_by_key() {
        let out = build();
        assert_eq!(f64s(&out, EIC_COUNT), vec![Some(10.0), Some(20.0), Some(10.0), Some(20.0)]);
        assert_eq!(
            f64s(&out, EUROS_PER_MWH),
            vec![Some(92.51), Some(92.51), Some(88.9), Some(88.9)]
        );
        assert_eq!(f64s(&out, LOWEST_PRICE_PER_MWH), vec![Some(45.23); 4]);
        assert_eq!(f64s(&out, HIGHEST_PRICE_PER_MWH), vec![Some(46.32); 4]);
    }

    #[test]
    fn weather_and_forecast_lags() {
        let out = build();
        assert_eq!(
            f64s(&out, "historical_temperature"),
            vec![Some(14.0), Some(15.0), Some(16.0), Some(17.0)]
        );
        assert_eq!(
            f64s(&out, "forecast_temperature"),
            vec![Some(10.0), Some(20.0), Some(11.0), Some(21.0)]
        );
        // Lag -1 reads the next hour's forecast.
        assert_eq!(
            f64s(&out, "forecast_temperature_-1"),
            vec![Some(11.0), Some(21.0), Some(12.0), None]
        );
        // Lag +1 reads the previous hour's forecast.
        assert_eq!(
            f64s(&out, "forecast_temperature_1"),
            vec![Some(9.0), None, Some(10.0), Some(20.0)]
        );

        let global = f64s(&out, "forecast_global_temperature");
        assert_relative_eq!(global[0].unwrap(), 15.0);
        assert_relative_eq!(global[2].unwrap(), 16.0);
    }

    #[test]
    fn target_reattached_and_ratio_missing_without_history() {
        let out = build();
        assert_eq!(f64s(&out, TARGET), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(f64s(&out, "target_48"), vec![None; 4]);
        assert_eq!(f64s(&out, TARGET_RATIO), vec![None; 4]);
        assert_eq!(out.width(), 41);
    }

    #[test]
    fn separate_targets_table_feeds_lags() {
        let mut tables = tables(raw_base());
        tables.targets = Some(
            df! {
                "county" => &[0_i64],
                "is_business" => &[0_i64],
                "product_type" => &[1_i64],
                "is_consumption" => &[1_i64],
                "target" => &[7.0],
                "datetime" => &["2021-09-01 00:00:00"],
            }
            .unwrap(),
        );

        let out = get_features(tables, &counties()).unwrap();
        assert_eq!(f64s(&out, "target_48"), vec![Some(7.0), None, None, None]);
        assert_eq!(f64s(&out, "target_49"), vec![None, None, Some(7.0), None]);
        // The label still comes from the base rows.
        assert_eq!(f64s(&out, TARGET), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn truncation_keeps_hours_from_48() {
        let base = df! {
            "county" => &[0_i64; 4],
            "is_business" => &[0_i64; 4],
            "product_type" => &[1_i64; 4],
            "is_consumption" => &[0_i64; 4],
            "datetime" => &[
                "2021-09-01 00:00:00",
                "2021-09-02 23:00:00",
                "2021-09-03 00:00:00",
                "2021-09-03 01:00:00",
            ],
        }
        .unwrap();
        let mut tables = tables(base.clone());
        tables.targets = Some(base.lazy().with_column(lit(1.0).alias(TARGET)).collect().unwrap());

        let out = get_features(tables, &counties()).unwrap();
        assert_eq!(i64s(&out, TIME_ID), vec![Some(48), Some(49)]);
        assert!(out.column(TARGET).is_err());
    }

    #[test]
    fn inference_without_any_target_fails() {
        let base = raw_base().drop(TARGET).unwrap();
        let err = get_features(tables(base), &counties()).unwrap_err();
        assert_eq!(err.to_string(), "missing column: target");
    }

    #[test]
    fn target_ratio_arithmetic() {
        let df = df! {
            "target_168" => &[Some(336.0), None, Some(1.0)],
            "target_336" => &[Some(168.0), Some(2.0), None],
        }
        .unwrap();

        let out = df.lazy().select([target_ratio()]).collect().unwrap();
        let ratio = f64s(&out, TARGET_RATIO);
        assert_relative_eq!(ratio[0].unwrap(), 336.0 / 168.0001, epsilon = 1e-12);
        assert_eq!(ratio[1], None);
        assert_eq!(ratio[2], None);
    }

    #[test]
    fn colliding_base_column_is_reported() {
        let mut base = raw_base();
        base.with_column(Series::new(EIC_COUNT.into(), &[1.0; 5])).unwrap();

        let err = get_features(tables(base), &counties()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ColumnCollision { ref fragment, ref column }
                if fragment == "client" && column == EIC_COUNT
        ));
    }

    #[test]
    fn weather_joins_use_source_keys() {
        let mut base = raw_base();
        base.with_column(Series::new("historical_temperature".into(), &[0.0; 5])).unwrap();

        let err = get_features(tables(base), &counties()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ColumnCollision { ref fragment, ref column }
                if fragment == "historical_weather" && column == "historical_temperature"
        ));

        let mut base = raw_base();
        base.with_column(Series::new("forecast_temperature_1".into(), &[0.0; 5])).unwrap();
        let err = get_features(tables(base), &counties()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ColumnCollision { ref fragment, .. } if fragment == "forecast lag 1"
        ));
    }

    #[test]
    fn select_values_keeps_keys_first() {
        let gas = df! {
            "highest_price_per_mwh" => &[46.32],
            "forecast_date" => &["2021-09-02"],
            "data_block_id" => &[2_i64],
            "lowest_price_per_mwh" => &[45.23],
        }
        .unwrap();

        let out = select_values(
            &gas,
            GasSource::new().join_keys(),
            &[LOWEST_PRICE_PER_MWH, HIGHEST_PRICE_PER_MWH],
        )
        .unwrap();
        assert_eq!(
            prosumer_utils::column_names(&out),
            vec!["data_block_id", "lowest_price_per_mwh", "highest_price_per_mwh"]
        );
    }

    #[test]
    fn duplicated_client_rows() {
        let mut tables = tables(raw_base());
        let extra = tables.client.slice(0, 1);
        tables.client.vstack_mut(&extra).unwrap();

        let lenient = FeatureBuilder::new().build(tables.clone(), &counties()).unwrap();
        assert_eq!(lenient.height(), 6);

        let strict = FeatureBuilder::with_config(PipelineConfig {
            strict_row_count: true,
            ..PipelineConfig::default()
        });
        let err = strict.build(tables, &counties()).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateRows { expected: 5, actual: 7 }));
        assert!(err.is_data_error());
    }

    #[test]
    fn missing_gas_column() {
        let mut tables = tables(raw_base());
        tables.gas = tables.gas.drop(HIGHEST_PRICE_PER_MWH).unwrap();

        let err = get_features(tables, &counties()).unwrap_err();
        assert_eq!(err.to_string(), "missing column: highest_price_per_mwh");
        assert!(err.is_data_error());
    }

    #[test]
    fn empty_county_map_leaves_weather_missing() {
        let out = get_features(tables(raw_base()), &CountyMap::default()).unwrap();
        assert_eq!(out.height(), 4);
        assert_eq!(f64s(&out, "historical_temperature"), vec![None; 4]);
        assert_eq!(f64s(&out, EUROS_PER_MWH)[0], Some(92.51));
    }

    #[test]
    fn feature_columns_skip_indices_and_label() {
        let out = build();
        let features = FeatureBuilder::feature_columns(&out, &[]);

        assert!(!features.iter().any(|c| c == TIME_ID || c == DATA_BLOCK_ID || c == TARGET));
        assert!(!features.iter().any(|c| c == DATETIME));
        assert!(features.iter().any(|c| c == COUNTY));
        assert!(features.iter().any(|c| c == TARGET_RATIO));
        assert_eq!(features.len(), 41 - 4);
    }
}
