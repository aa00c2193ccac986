//! Calendar encodings of base timestamps.

use std::{collections::HashSet, f64::consts::TAU};

use chrono::Datelike;
use polars::prelude::*;
use prosumer_primitives::{TimeIndexer, Timestamp, columns::*};
use prosumer_traits::{FeatureSource, SourceContext, SourceError, SourceKind};
use prosumer_utils::timestamps;
use tracing::debug;

/// Hours in the yearly cycle.
pub const YEAR_PERIOD_HOURS: f64 = 365.0 * 24.0;
/// Phase offset of the yearly cycle, in hours.
pub const YEAR_PHASE_HOURS: f64 = 244.0;
/// Hours in the half-year "month" cycle.
pub const MONTH_PERIOD_HOURS: f64 = 6.0 * 30.0 * 24.0;
/// Hours in the daily cycle.
pub const DAY_PERIOD_HOURS: f64 = 24.0;

/// Calendar features of one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarFeatures {
    /// Hourly index.
    pub time_id: i64,
    /// Yearly cycle, sine.
    pub year_sine: f64,
    /// Yearly cycle, cosine.
    pub year_cosine: f64,
    /// Half-year cycle, sine.
    pub month_sine: f64,
    /// Half-year cycle, cosine.
    pub month_cosine: f64,
    /// Daily cycle, sine.
    pub day_sine: f64,
    /// Daily cycle, cosine.
    pub day_cosine: f64,
    /// Monday = 0 through Sunday = 6.
    pub day_of_week: i64,
    /// 1 when `day_of_week > 5`.
    pub is_weekend: i64,
    /// Month of year, 1-12.
    pub month: i64,
    /// Day of month, 1-31.
    pub day_of_month: i64,
}

impl CalendarFeatures {
    /// Encode `ts` relative to the indexer's epoch.
    #[must_use]
    pub fn encode(ts: Timestamp, indexer: &TimeIndexer) -> Self {
        let time_id = indexer.time_id(ts).0;
        let hours = time_id as f64;
        let day_of_week = i64::from(ts.weekday().num_days_from_monday());

        Self {
            time_id,
            year_sine: ((hours + YEAR_PHASE_HOURS) * TAU / YEAR_PERIOD_HOURS).sin(),
            year_cosine: ((hours + YEAR_PHASE_HOURS) * TAU / YEAR_PERIOD_HOURS).cos(),
            month_sine: (hours * TAU / MONTH_PERIOD_HOURS).sin(),
            month_cosine: (hours * TAU / MONTH_PERIOD_HOURS).cos(),
            day_sine: (hours * TAU / DAY_PERIOD_HOURS).sin(),
            day_cosine: (hours * TAU / DAY_PERIOD_HOURS).cos(),
            day_of_week,
            // Only Sunday: kept as the established boundary, pending product confirmation.
            is_weekend: i64::from(day_of_week > 5),
            month: i64::from(ts.month()),
            day_of_month: i64::from(ts.day()),
        }
    }
}

/// Calendar features for the distinct hours in `stamps`.
///
/// One row per distinct `time_id`, in order of first appearance. Null
/// timestamps are skipped.
///
/// # Errors
/// Returns `SourceError` if the frame cannot be assembled.
pub fn time_features(
    stamps: &[Option<Timestamp>],
    indexer: &TimeIndexer,
) -> Result<DataFrame, SourceError> {
    let mut seen = HashSet::new();
    let rows: Vec<CalendarFeatures> = stamps
        .iter()
        .flatten()
        .map(|&ts| CalendarFeatures::encode(ts, indexer))
        .filter(|row| seen.insert(row.time_id))
        .collect();

    let column = |f: fn(&CalendarFeatures) -> f64| rows.iter().map(f).collect::<Vec<f64>>();
    let int_column = |f: fn(&CalendarFeatures) -> i64| rows.iter().map(f).collect::<Vec<i64>>();

    let out = df! {
        TIME_ID => int_column(|r| r.time_id),
        "year_sine" => column(|r| r.year_sine),
        "year_cosine" => column(|r| r.year_cosine),
        "month_sine" => column(|r| r.month_sine),
        "month_cosine" => column(|r| r.month_cosine),
        "day_sine" => column(|r| r.day_sine),
        "day_cosine" => column(|r| r.day_cosine),
        "day_of_week" => int_column(|r| r.day_of_week),
        "is_weekend" => int_column(|r| r.is_weekend),
        "month" => int_column(|r| r.month),
        "day_of_month" => int_column(|r| r.day_of_month),
    }?;

    Ok(out)
}

/// Calendar encodings of the base table's `datetime` column.
#[derive(Debug, Clone, Default)]
pub struct CalendarSource {
    config: (),
}

impl CalendarSource {
    /// Create a new calendar source.
    #[must_use]
    pub const fn new() -> Self {
        Self { config: () }
    }
}

impl FeatureSource for CalendarSource {
    type Config = ();

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Calendar
    }

    fn required_columns(&self) -> &[&str] {
        &[DATETIME]
    }

    fn join_keys(&self) -> &[&str] {
        &[TIME_ID]
    }

    fn features(&self, data: DataFrame, ctx: &SourceContext<'_>) -> Result<DataFrame, SourceError> {
        self.validate(&data)?;
        let stamps = timestamps(&data, DATETIME)?;
        let out = time_features(&stamps, &ctx.indexer)?;
        debug!(rows = out.height(), "calendar features encoded");
        Ok(out)
    }
}
