//! Indexed base rows and the target history.

use polars::prelude::*;
use prosumer_primitives::{Latency, TimeIndexer, Timestamp, columns::*};
use prosumer_utils::{
    cast_columns, has_column, index_series, index_values, require_columns, timestamps,
};
use tracing::debug;

use crate::PipelineError;

/// Position of a row in the base table. Internal; never part of the output.
pub(crate) const ROW_INDEX: &str = "__base_row";

/// Key columns of the base table, all Int64 after indexing.
const BASE_KEYS: [&str; 6] =
    [TIME_ID, DATA_BLOCK_ID, IS_CONSUMPTION, IS_BUSINESS, PRODUCT_TYPE, COUNTY];

/// Base rows with their hourly and daily indices.
///
/// The label is held apart from the rows so that it can be re-attached
/// after every feature join as an explicit override.
#[derive(Debug, Clone)]
pub struct BaseTable {
    rows: DataFrame,
    target: Option<DataFrame>,
    stamps: Vec<Option<Timestamp>>,
}

impl BaseTable {
    /// Index raw base rows.
    ///
    /// `time_id` is always derived from `datetime`. An existing
    /// `data_block_id` is kept; otherwise it is derived with `latency`.
    /// Columns other than the keys and `target` pass through unchanged.
    ///
    /// # Errors
    /// Returns `PipelineError` if a required column is missing or a
    /// timestamp cannot be parsed.
    pub fn new(
        rows: &DataFrame,
        indexer: &TimeIndexer,
        latency: Latency,
    ) -> Result<Self, PipelineError> {
        require_columns(rows, &[DATETIME])?;
        require_columns(rows, &SEGMENT_KEYS)?;

        let stamps = timestamps(rows, DATETIME)?;
        let time_ids = index_values(&stamps, |ts| indexer.time_id(ts).0);
        let mut indexed = rows.clone();
        indexed.with_column(index_series(TIME_ID, time_ids))?;
        if !has_column(&indexed, DATA_BLOCK_ID) {
            let blocks = index_values(&stamps, |ts| indexer.data_block_id(ts, latency).0);
            indexed.with_column(index_series(DATA_BLOCK_ID, blocks))?;
        }

        let has_target = has_column(&indexed, TARGET);
        let lf = indexed.lazy().with_row_index(ROW_INDEX, None);

        let target = if has_target {
            let target = lf
                .clone()
                .select([col(ROW_INDEX), col(TARGET).cast(DataType::Float64)])
                .collect()?;
            Some(target)
        } else {
            None
        };

        let mut lf = cast_columns(lf, &BASE_KEYS, &DataType::Int64);
        if has_target {
            lf = lf.drop([TARGET]);
        }
        let rows = lf.collect()?;

        debug!(rows = rows.height(), has_target, "base rows indexed");
        Ok(Self { rows, target, stamps })
    }

    /// Indexed rows, without `target`.
    #[must_use]
    pub const fn rows(&self) -> &DataFrame {
        &self.rows
    }

    /// Number of base rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.height()
    }

    /// Parsed `datetime` of each row.
    #[must_use]
    pub fn timestamps(&self) -> &[Option<Timestamp>] {
        &self.stamps
    }

    /// Whether the base rows carried a `target` column.
    #[must_use]
    pub const fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// The base rows as a target history, keyed by the target keys.
    ///
    /// # Errors
    /// Returns `PipelineError::Utils` with `MissingColumn("target")` when
    /// the base rows carry no label.
    pub fn target_source(&self) -> Result<DataFrame, PipelineError> {
        let target = self.target.as_ref().ok_or_else(|| PipelineError::missing_column(TARGET))?;

        let mut exprs: Vec<Expr> = TARGET_KEYS.iter().map(|&k| col(k)).collect();
        exprs.push(col(TARGET));

        let out = self
            .rows
            .clone()
            .lazy()
            .join(
                target.clone().lazy(),
                [col(ROW_INDEX)],
                [col(ROW_INDEX)],
                JoinArgs::new(JoinType::Left),
            )
            .select(exprs)
            .collect()?;
        Ok(out)
    }

    /// Set `target` on `features` from the base rows, replacing any column
    /// of that name. Last write wins. Without a base label the frame is
    /// returned unchanged.
    pub(crate) fn attach_target(&self, features: LazyFrame) -> LazyFrame {
        match &self.target {
            Some(target) => features.select([col("*").exclude([TARGET])]).join(
                target.clone().lazy(),
                [col(ROW_INDEX)],
                [col(ROW_INDEX)],
                JoinArgs::new(JoinType::Left),
            ),
            None => features,
        }
    }
}

/// Index a separate targets table: `time_id` from `datetime`, keys cast to
/// Int64 and `target` to Float64.
///
/// # Errors
/// Returns `PipelineError` if a column is missing or a timestamp cannot be
/// parsed.
pub fn index_targets(
    targets: &DataFrame,
    indexer: &TimeIndexer,
) -> Result<DataFrame, PipelineError> {
    require_columns(targets, &[DATETIME, TARGET])?;
    require_columns(targets, &SEGMENT_KEYS)?;

    let stamps = timestamps(targets, DATETIME)?;
    let time_ids = index_values(&stamps, |ts| indexer.time_id(ts).0);
    let mut indexed = targets.clone();
    indexed.with_column(index_series(TIME_ID, time_ids))?;

    let mut exprs: Vec<Expr> =
        TARGET_KEYS.iter().map(|&k| col(k).cast(DataType::Int64)).collect();
    exprs.push(col(TARGET).cast(DataType::Float64));

    let out = indexed.lazy().select(exprs).collect()?;
    debug!(rows = out.height(), "targets table indexed");
    Ok(out)
}
