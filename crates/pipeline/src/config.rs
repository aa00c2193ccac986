//! Pipeline configuration.

use prosumer_primitives::{Latency, TimeIndexer};
use prosumer_sources::{
    ClientConfig, ElectricityConfig, ForecastWeatherConfig, GasConfig, HistoricalWeatherConfig,
};
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Configuration for [`FeatureBuilder`](crate::FeatureBuilder).
///
/// Every field has a default matching the prosumer dataset, so a partial
/// JSON document only needs the fields it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Epoch all indices are measured from.
    pub indexer: TimeIndexer,
    /// Latency applied when the base table carries no `data_block_id`.
    pub base_latency: Latency,
    /// Client source settings.
    pub client: ClientConfig,
    /// Gas price source settings.
    pub gas: GasConfig,
    /// Electricity price source settings.
    pub electricity: ElectricityConfig,
    /// Historical weather source settings.
    pub historical_weather: HistoricalWeatherConfig,
    /// Forecast weather source settings.
    pub forecast_weather: ForecastWeatherConfig,
    /// Fail instead of warning when the joins duplicate base rows.
    pub strict_row_count: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            indexer: TimeIndexer::default(),
            base_latency: Latency::NONE,
            client: ClientConfig::default(),
            gas: GasConfig::default(),
            electricity: ElectricityConfig::default(),
            historical_weather: HistoricalWeatherConfig::default(),
            forecast_weather: ForecastWeatherConfig::default(),
            strict_row_count: false,
        }
    }
}

impl PipelineConfig {
    /// Check the settings before any table is touched.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfig` on a negative latency or
    /// back shift, or on clashing weather prefixes.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let latencies = [
            ("base", self.base_latency),
            ("client", self.client.latency),
            ("gas", self.gas.latency),
            ("electricity", self.electricity.latency),
            ("historical_weather", self.historical_weather.latency),
            ("forecast_weather", self.forecast_weather.latency),
        ];
        if let Some((name, latency)) = latencies.iter().find(|(_, l)| l.0 < 0) {
            return Err(PipelineError::InvalidConfig(format!(
                "{name} latency must be non-negative, got {}",
                latency.0
            )));
        }

        if self.historical_weather.back_shift_hours < 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "historical back shift must be non-negative, got {}",
                self.historical_weather.back_shift_hours
            )));
        }

        let prefixes = [
            &self.historical_weather.prefix,
            &self.forecast_weather.prefix,
            &self.forecast_weather.global_prefix,
        ];
        for (i, a) in prefixes.iter().enumerate() {
            if a.is_empty() {
                return Err(PipelineError::InvalidConfig(
                    "weather prefixes must not be empty".to_string(),
                ));
            }
            if prefixes[i + 1..].contains(a) {
                return Err(PipelineError::InvalidConfig(format!(
                    "weather prefix {a:?} is used twice"
                )));
            }
        }

        Ok(())
    }
}
