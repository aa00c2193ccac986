//! Forward filling utilities.

use polars::prelude::*;

/// Forward fill missing values in feature columns.
///
/// Optionally sorts first, then fills each column from the nearest
/// preceding non-null value, within each partition when `over_col` is set.
/// Values are never pulled backward in row order.
///
/// # Arguments
/// * `df` - Input LazyFrame
/// * `features` - Column names to fill
/// * `sort_cols` - Columns to sort by before filling (empty keeps row order)
/// * `over_col` - Column to partition by (typically "county")
///
/// # Returns
/// LazyFrame with filled features.
pub fn fill_forward(
    df: LazyFrame,
    features: &[String],
    sort_cols: &[&str],
    over_col: Option<&str>,
) -> LazyFrame {
    let lf = if sort_cols.is_empty() {
        df
    } else {
        let by: Vec<&str> = sort_cols.to_vec();
        df.sort(by, SortMultipleOptions::new().with_maintain_order(true))
    };

    if features.is_empty() {
        return lf;
    }

    let exprs: Vec<Expr> = features
        .iter()
        .map(|feat| {
            let filled = col(feat.as_str()).forward_fill(None);
            match over_col {
                Some(over) => filled.over([col(over)]).alias(feat.as_str()),
                None => filled.alias(feat.as_str()),
            }
        })
        .collect();

    lf.with_columns(exprs)
}

/// Forward fill every column in current row order.
pub fn fill_forward_all(df: LazyFrame) -> LazyFrame {
    df.with_columns([col("*").forward_fill(None)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_forward_within_partition() {
        let df = df! {
            "time_id" => &[1, 2, 3, 1, 2, 3],
            "county" => &[0, 0, 0, 1, 1, 1],
            "value" => &[Some(1.0), None, Some(3.0), None, Some(20.0), None],
        }
        .unwrap()
        .lazy();

        let result = fill_forward(df, &["value".to_string()], &["county", "time_id"], Some("county"))
            .collect()
            .unwrap();

        let values: Vec<Option<f64>> =
            result.column("value").unwrap().f64().unwrap().into_iter().collect();

        // County 0: [1, None, 3] -> [1, 1, 3]
        // County 1: [None, 20, None] -> [None, 20, 20], never back-filled
        assert_eq!(values, vec![Some(1.0), Some(1.0), Some(3.0), None, Some(20.0), Some(20.0)]);
    }

    #[test]
    fn fill_forward_sorts_before_filling() {
        let df = df! {
            "time_id" => &[3, 1, 2],
            "value" => &[None, Some(1.0), None],
        }
        .unwrap()
        .lazy();

        let result = fill_forward(df, &["value".to_string()], &["time_id"], None).collect().unwrap();

        let ids: Vec<i32> =
            result.column("time_id").unwrap().i32().unwrap().into_no_null_iter().collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let values: Vec<Option<f64>> =
            result.column("value").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(1.0), Some(1.0)]);
    }

    #[test]
    fn fill_forward_never_looks_ahead() {
        let df = df! {
            "value" => &[None, None, Some(5.0), None],
        }
        .unwrap()
        .lazy();

        let result = fill_forward_all(df).collect().unwrap();
        let values: Vec<Option<f64>> =
            result.column("value").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![None, None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn fill_forward_all_keeps_row_order() {
        let df = df! {
            "forecast_date" => &[Some("2021-09-01"), None, Some("2021-09-03")],
            "price" => &[Some(45.2), None, None],
        }
        .unwrap()
        .lazy();

        let result = fill_forward_all(df).collect().unwrap();
        assert_eq!(result.column("forecast_date").unwrap().str().unwrap().get(1), Some("2021-09-01"));
        assert_eq!(result.column("price").unwrap().f64().unwrap().get(2), Some(45.2));
    }
}
