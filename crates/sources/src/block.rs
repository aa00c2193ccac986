//! Index column helpers shared by the sources.

use polars::prelude::*;
use prosumer_primitives::{CountyMap, Latency, TimeIndexer, columns::*};
use prosumer_traits::SourceError;
use prosumer_utils::{has_column, index_series, index_values, timestamps};

/// Add `data_block_id` from `date_column` unless the table already has one.
pub(crate) fn ensure_data_block_id(
    data: &mut DataFrame,
    date_column: &str,
    indexer: &TimeIndexer,
    latency: Latency,
) -> Result<(), SourceError> {
    if has_column(data, DATA_BLOCK_ID) {
        return Ok(());
    }

    let stamps = timestamps(data, date_column)?;
    let ids = index_values(&stamps, |ts| indexer.data_block_id(ts, latency).0);
    data.with_column(index_series(DATA_BLOCK_ID, ids))?;
    Ok(())
}

/// County of every row, `None` where the rounded coordinate is unmapped.
pub(crate) fn county_ids(
    data: &DataFrame,
    counties: &CountyMap,
) -> Result<Vec<Option<i64>>, SourceError> {
    let lat = data.column(LATITUDE)?.cast(&DataType::Float64)?;
    let lon = data.column(LONGITUDE)?.cast(&DataType::Float64)?;

    let ids = lat
        .f64()?
        .into_iter()
        .zip(lon.f64()?)
        .map(|(lat, lon)| match (lat, lon) {
            (Some(lat), Some(lon)) => counties.county_at(lat, lon).map(i64::from),
            _ => None,
        })
        .collect();

    Ok(ids)
}
