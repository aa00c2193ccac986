//! Feature source trait definitions.

use polars::prelude::*;
use prosumer_primitives::{CountyMap, TimeIndexer};
use prosumer_utils::require_columns;

use crate::SourceError;

/// The kind of raw table a source consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Client metadata (installed capacity, consumption points).
    Client,
    /// Day-ahead gas prices.
    Gas,
    /// Hourly electricity prices.
    Electricity,
    /// Observed weather.
    HistoricalWeather,
    /// Forecast weather.
    ForecastWeather,
    /// Calendar encodings of the base timestamps.
    Calendar,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Gas => write!(f, "gas"),
            Self::Electricity => write!(f, "electricity"),
            Self::HistoricalWeather => write!(f, "historical_weather"),
            Self::ForecastWeather => write!(f, "forecast_weather"),
            Self::Calendar => write!(f, "calendar"),
        }
    }
}

/// Shared, read-only inputs every source may consult.
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    /// Epoch-anchored time indexer.
    pub indexer: TimeIndexer,
    /// Grid coordinate to county mapping.
    pub counties: &'a CountyMap,
}

impl<'a> SourceContext<'a> {
    /// Create a new context.
    #[must_use]
    pub const fn new(indexer: TimeIndexer, counties: &'a CountyMap) -> Self {
        Self { indexer, counties }
    }
}

/// A raw table normalizer or aggregator.
///
/// Implementations turn one raw table into a time-indexed feature table
/// whose rows can be left-joined onto the base table on [`join_keys`].
///
/// [`join_keys`]: FeatureSource::join_keys
pub trait FeatureSource: Send + Sync {
    /// Configuration type for this source.
    type Config: Default + Clone + Send + Sync;

    /// Create a new source with the given configuration.
    fn with_config(config: Self::Config) -> Self
    where
        Self: Sized;

    /// Get the configuration.
    fn config(&self) -> &Self::Config;

    /// Returns the kind of table this source consumes.
    fn kind(&self) -> SourceKind;

    /// Columns the raw table must provide.
    fn required_columns(&self) -> &[&str];

    /// Columns the produced table joins on.
    fn join_keys(&self) -> &[&str];

    /// Check the raw table against [`required_columns`](FeatureSource::required_columns).
    ///
    /// # Errors
    /// Returns a missing column error naming the first absent column.
    fn validate(&self, data: &DataFrame) -> Result<(), SourceError> {
        require_columns(data, self.required_columns())?;
        Ok(())
    }

    /// Build the feature table.
    ///
    /// # Errors
    /// Returns `SourceError` if required columns are missing, timestamps
    /// cannot be parsed or the computation fails.
    fn features(&self, data: DataFrame, ctx: &SourceContext<'_>) -> Result<DataFrame, SourceError>;
}
