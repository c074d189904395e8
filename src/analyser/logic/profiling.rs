//! Column access and value profiling shared by the analysis and chart code.
//!
//! Every numeric read goes through [`numeric_chunked`], which casts to
//! `Float64` and turns `NaN` into null so that "missing" means one thing
//! everywhere downstream.

use super::types::ColumnKind;
use crate::error::{DashError, Result};
use polars::prelude::*;

/// Number of bins used when every value is identical.
const SINGLE_VALUE_BINS: usize = 20;

pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| DashError::missing_column(name))
}

pub fn require_numeric<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    let col = require_column(df, name)?;
    if ColumnKind::of_dtype(col.dtype()) == Some(ColumnKind::Numeric) {
        Ok(col)
    } else {
        Err(DashError::wrong_kind(name, "numeric"))
    }
}

/// Column values as `Float64`, with `NaN` mapped to null.
pub fn numeric_chunked(col: &Column) -> Result<Float64Chunked> {
    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    let ca = series.f64()?;
    let cleaned: Float64Chunked = ca
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(cleaned.with_name(col.name().clone()))
}

/// Row-aligned values of a numeric column; `None` marks a missing value.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = require_numeric(df, name)?;
    Ok(numeric_chunked(col)?.into_iter().collect())
}

/// Row-aligned millisecond timestamps of a `Date`/`Datetime` column.
pub fn timestamp_values(col: &Column) -> Result<Vec<Option<i64>>> {
    let series = col
        .as_materialized_series()
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

/// Row-aligned string rendering of any column.
pub fn label_values(col: &Column) -> Result<Vec<Option<String>>> {
    let series = col.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}

/// Fixed-width histogram over the non-missing values: `(bin start, count)`.
///
/// Bin width follows the Freedman–Diaconis rule, clamped to 5..=50 bins. A
/// constant column gets 20 unit-wide bins with every value in the middle one.
pub fn calculate_histogram(ca: &Float64Chunked) -> (f64, Vec<(f64, usize)>) {
    let (Some(min_v), Some(max_v)) = (ca.min(), ca.max()) else {
        return (0.0, Vec::new());
    };
    let n = ca.len() - ca.null_count();

    if (max_v - min_v).abs() < f64::EPSILON {
        let bin_width = 1.0;
        let start = min_v - (SINGLE_VALUE_BINS / 2) as f64 * bin_width;
        let histogram = (0..SINGLE_VALUE_BINS)
            .map(|i| {
                let count = if i == SINGLE_VALUE_BINS / 2 { n } else { 0 };
                (start + i as f64 * bin_width, count)
            })
            .collect();
        return (bin_width, histogram);
    }

    let q1 = ca
        .quantile(0.25, QuantileMethod::Linear)
        .unwrap_or(None)
        .unwrap_or(min_v);
    let q3 = ca
        .quantile(0.75, QuantileMethod::Linear)
        .unwrap_or(None)
        .unwrap_or(max_v);
    let iqr = q3 - q1;

    let h = if iqr > 0.0 {
        2.0 * iqr / (n as f64).cbrt()
    } else {
        (max_v - min_v) / (n as f64).sqrt()
    };

    let num_bins = (((max_v - min_v) / h).ceil() as usize).clamp(5, 50);
    let bin_width = (max_v - min_v) / num_bins as f64;

    let mut bins = vec![0_usize; num_bins];
    for val in ca.into_iter().flatten() {
        let idx = (((val - min_v) / bin_width).floor() as usize).min(num_bins - 1);
        if let Some(bin) = bins.get_mut(idx) {
            *bin += 1;
        }
    }

    let histogram = bins
        .into_iter()
        .enumerate()
        .map(|(i, count)| (min_v + i as f64 * bin_width, count))
        .collect();
    (bin_width, histogram)
}
