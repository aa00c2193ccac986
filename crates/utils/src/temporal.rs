//! Reading timestamp columns and writing index columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use prosumer_primitives::Timestamp;

use crate::UtilsError;

const DATETIME_FORMATS: [&str; 4] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

const OFFSET_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S%#z"];

/// Parse one timestamp string.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (optionally with a `T`
/// separator, fractional seconds or a UTC offset). Offset timestamps keep
/// their wall-clock reading.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
                .or_else(|| DateTime::parse_from_rfc3339(value).ok())
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Read a timestamp column into `chrono` values.
///
/// String, `Date` and `Datetime` columns are supported. Nulls stay `None`.
///
/// `Datetime` columns are read as UTC, whatever time zone the dtype
/// carries. Offset strings keep their wall-clock reading instead, so the
/// two agree only for UTC data. Convert zoned columns to local wall-clock
/// time (or to strings) before indexing them.
///
/// # Errors
/// Returns `UtilsError::MissingColumn` if the column is absent,
/// `UtilsError::Parse` on the first unreadable value and
/// `UtilsError::UnsupportedType` for any other dtype.
pub fn timestamps(df: &DataFrame, column: &str) -> Result<Vec<Option<Timestamp>>, UtilsError> {
    let values = df.column(column).map_err(|_| UtilsError::MissingColumn(column.to_string()))?;

    match values.dtype() {
        DataType::String => values
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|opt| {
                opt.map(|s| {
                    parse_timestamp(s).ok_or_else(|| UtilsError::Parse {
                        column: column.to_string(),
                        value: s.to_string(),
                    })
                })
                .transpose()
            })
            .collect(),
        // The zone is ignored: stored values are UTC instants.
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = values.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .map(|opt| {
                    opt.map(|v| {
                        from_epoch_units(v, unit).ok_or_else(|| UtilsError::Parse {
                            column: column.to_string(),
                            value: v.to_string(),
                        })
                    })
                    .transpose()
                })
                .collect()
        }
        DataType::Date => {
            let raw = values.cast(&DataType::Int32)?;
            raw.i32()?
                .into_iter()
                .map(|opt| {
                    opt.map(|days| {
                        DateTime::from_timestamp(i64::from(days) * 86_400, 0)
                            .map(|dt| dt.naive_utc())
                            .ok_or_else(|| UtilsError::Parse {
                                column: column.to_string(),
                                value: days.to_string(),
                            })
                    })
                    .transpose()
                })
                .collect()
        }
        other => Err(UtilsError::UnsupportedType {
            column: column.to_string(),
            dtype: other.to_string(),
        }),
    }
}

fn from_epoch_units(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    dt.map(|dt| dt.naive_utc())
}

/// Map parsed timestamps through `index`, keeping nulls.
pub fn index_values<F>(stamps: &[Option<Timestamp>], index: F) -> Vec<Option<i64>>
where
    F: Fn(Timestamp) -> i64,
{
    stamps.iter().map(|ts| ts.map(&index)).collect()
}

/// Build an `Int64` index column named `name`.
#[must_use]
pub fn index_series(name: &str, values: Vec<Option<i64>>) -> Series {
    Series::new(name.into(), values)
}
