use super::types::ColumnKind;
use crate::error::Result;
use polars::prelude::*;

/// Deduplicates rows and fills missing numeric values with the column median.
///
/// Steps:
/// 1. `NaN` in float columns becomes null.
/// 2. Exact duplicate rows are dropped, keeping the first occurrence.
/// 3. Nulls in numeric columns are filled with the median of the
///    deduplicated, non-missing values. A column with no values at all stays
///    missing.
/// 4. Duplicates are dropped again, since imputation can make two rows equal.
///
/// Non-numeric columns are left as they are. The input is not modified.
pub fn clean_df(df: &DataFrame) -> Result<DataFrame> {
    if df.width() == 0 || df.height() == 0 {
        return Ok(df.clone());
    }

    let schema = df.schema();
    let mut nan_exprs = Vec::new();
    let mut impute_exprs = Vec::new();

    for (name, dtype) in schema.iter() {
        if dtype.is_float() {
            nan_exprs.push(col(name.as_str()).fill_nan(lit(NULL)));
        }
        // Integer columns without gaps keep their dtype.
        let has_gaps = dtype.is_float()
            || df
                .column(name.as_str())
                .is_ok_and(|c| c.null_count() > 0);
        if ColumnKind::of_dtype(dtype) == Some(ColumnKind::Numeric) && has_gaps {
            impute_exprs.push(impute_median(name.as_str()));
        }
    }

    let before = df.height();
    let mut lf = df.clone().lazy();
    if !nan_exprs.is_empty() {
        lf = lf.with_columns(nan_exprs);
    }
    lf = lf.unique_stable(None, UniqueKeepStrategy::First);
    if !impute_exprs.is_empty() {
        lf = lf
            .with_columns(impute_exprs)
            .unique_stable(None, UniqueKeepStrategy::First);
    }

    let cleaned = lf.collect()?;
    tracing::info!(
        rows_before = before,
        rows_after = cleaned.height(),
        "Cleaned table"
    );
    Ok(cleaned)
}

fn impute_median(name: &str) -> Expr {
    col(name).fill_null(col(name).median())
}

/// Names of numeric columns that still contain missing values.
pub fn numeric_columns_with_gaps(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| ColumnKind::of_dtype(c.dtype()) == Some(ColumnKind::Numeric))
        .filter(|c| c.null_count() > 0 || has_nan(c))
        .map(|c| c.name().to_string())
        .collect()
}

fn has_nan(col: &Column) -> bool {
    col.dtype().is_float()
        && col
            .as_materialized_series()
            .cast(&DataType::Float64)
            .is_ok_and(|s| s.f64().is_ok_and(|ca| ca.into_iter().flatten().any(f64::is_nan)))
}
