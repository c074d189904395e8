use super::classify::numeric_columns;
use super::profiling::{numeric_chunked, numeric_values, require_column, require_numeric};
use super::types::{Aggregator, CorrelationMatrix, OutlierMethod, StatsRecord};
use crate::error::{DashError, Result};
use polars::prelude::*;

/// Mean, median, sample std, min, max and quartiles of a numeric column.
///
/// Missing values are excluded from every statistic; quantiles use linear
/// interpolation between order statistics.
///
/// # Errors
///
/// `DashError::Column` if `column` is absent or not numeric.
pub fn basic_stats(df: &DataFrame, column: &str) -> Result<StatsRecord> {
    let col = require_numeric(df, column)?;
    let ca = numeric_chunked(col)?;
    let present = ca.len() - ca.null_count();

    if present == 0 {
        return Ok(StatsRecord::undefined());
    }

    let quantile = |q: f64| -> Result<f64> {
        Ok(ca
            .quantile(q, QuantileMethod::Linear)?
            .unwrap_or(f64::NAN))
    };

    // A single observation has no sample variance.
    let std = if present < 2 {
        f64::NAN
    } else {
        ca.std(1).unwrap_or(f64::NAN)
    };

    let stats = StatsRecord {
        mean: ca.mean().unwrap_or(f64::NAN),
        median: ca.median().unwrap_or(f64::NAN),
        std,
        min: ca.min().unwrap_or(f64::NAN),
        max: ca.max().unwrap_or(f64::NAN),
        q25: quantile(0.25)?,
        q75: quantile(0.75)?,
    };
    tracing::debug!(column, present, "Computed basic stats");
    Ok(stats)
}

/// [`basic_stats`] for every numeric column, in table order.
pub fn describe(df: &DataFrame) -> Result<Vec<(String, StatsRecord)>> {
    numeric_columns(df)
        .into_iter()
        .map(|name| {
            let stats = basic_stats(df, &name)?;
            Ok((name, stats))
        })
        .collect()
}

/// Pearson correlation over pairwise-complete observations.
///
/// With `columns = None` every numeric column takes part. A pair with zero
/// variance or fewer than two complete rows yields `NaN`; the diagonal is
/// always 1.0.
///
/// # Errors
///
/// `DashError::Column` if a requested column is absent or not numeric.
pub fn calculate_correlation(
    df: &DataFrame,
    columns: Option<&[String]>,
) -> Result<CorrelationMatrix> {
    let names = match columns {
        Some(names) => names.to_vec(),
        None => numeric_columns(df),
    };

    let values = names
        .iter()
        .map(|name| numeric_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let n = names.len();
    let mut data = vec![vec![f64::NAN; n]; n];
    for (i, a) in values.iter().enumerate() {
        for (j, b) in values.iter().enumerate().skip(i) {
            let r = if i == j { 1.0 } else { pearson(a, b) };
            if let Some(cell) = data.get_mut(i).and_then(|row| row.get_mut(j)) {
                *cell = r;
            }
            if let Some(cell) = data.get_mut(j).and_then(|row| row.get_mut(i)) {
                *cell = r;
            }
        }
    }

    tracing::debug!(columns = n, "Computed correlation matrix");
    Ok(CorrelationMatrix {
        columns: names,
        data,
    })
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Groups rows by `group_column` and reduces `value_column` per group.
///
/// Groups appear in first-seen order; rows with a missing key form their own
/// group. The metric column keeps the value column's name unless that would
/// clash with the key, in which case it becomes `"{aggregator}_{value}"`.
///
/// # Errors
///
/// `DashError::Column` if either column is absent, or if the value column is
/// not numeric for an aggregator other than `count`.
pub fn group_and_aggregate(
    df: &DataFrame,
    group_column: &str,
    value_column: &str,
    aggregator: Aggregator,
) -> Result<DataFrame> {
    require_column(df, group_column)?;
    if aggregator.needs_numeric() {
        require_numeric(df, value_column)?;
    } else {
        require_column(df, value_column)?;
    }

    let metric_name = if group_column == value_column {
        format!("{aggregator}_{value_column}")
    } else {
        value_column.to_owned()
    };

    let value_expr = if aggregator.needs_numeric() {
        col(value_column).cast(DataType::Float64).fill_nan(lit(NULL))
    } else {
        col(value_column)
    };

    let result = df
        .clone()
        .lazy()
        .group_by_stable([col(group_column)])
        .agg([aggregator.apply(value_expr).alias(metric_name.as_str())])
        .collect()?;

    tracing::debug!(
        group_column,
        value_column,
        %aggregator,
        groups = result.height(),
        "Grouped and aggregated"
    );
    Ok(result)
}

/// Parses `tag` and runs [`group_and_aggregate`].
///
/// # Errors
///
/// `DashError::Aggregator` for an unsupported tag, otherwise as
/// [`group_and_aggregate`].
pub fn group_and_aggregate_by_tag(
    df: &DataFrame,
    group_column: &str,
    value_column: &str,
    tag: &str,
) -> Result<DataFrame> {
    let aggregator: Aggregator = tag.parse()?;
    group_and_aggregate(df, group_column, value_column, aggregator)
}

/// Flags rows whose value lies strictly outside the IQR fence.
///
/// Missing values are never flagged. An unsupported `method` yields an
/// all-false mask instead of an error.
///
/// # Errors
///
/// `DashError::Column` if `column` is absent or not numeric.
pub fn detect_outliers(df: &DataFrame, column: &str, method: &str) -> Result<BooleanChunked> {
    let col = require_numeric(df, column)?;
    let name = format!("{column}_outlier");

    let Some(method) = OutlierMethod::from_tag(method) else {
        tracing::warn!(column, method, "Unsupported outlier method, flagging nothing");
        return Ok(all_false(&name, df.height()));
    };

    let ca = numeric_chunked(col)?;
    let (lower, upper) = match method {
        OutlierMethod::Iqr => {
            let q1 = ca.quantile(0.25, QuantileMethod::Linear)?;
            let q3 = ca.quantile(0.75, QuantileMethod::Linear)?;
            let (Some(q1), Some(q3)) = (q1, q3) else {
                return Ok(all_false(&name, df.height()));
            };
            let iqr = q3 - q1;
            (
                q1 - OutlierMethod::IQR_FENCE * iqr,
                q3 + OutlierMethod::IQR_FENCE * iqr,
            )
        }
    };

    let mask: BooleanChunked = ca
        .into_iter()
        .map(|v| v.is_some_and(|x| x < lower || x > upper))
        .collect();
    tracing::debug!(
        column,
        lower,
        upper,
        flagged = mask.sum().unwrap_or(0),
        "Detected outliers"
    );
    Ok(mask.with_name(name.into()))
}

fn all_false(name: &str, len: usize) -> BooleanChunked {
    BooleanChunked::full(name.into(), false, len)
}

/// Rows of `df` flagged by `mask`.
pub fn filter_rows(df: &DataFrame, mask: &BooleanChunked) -> Result<DataFrame> {
    if mask.len() != df.height() {
        return Err(DashError::DataProcessing(format!(
            "mask length {} does not match table height {}",
            mask.len(),
            df.height()
        )));
    }
    Ok(df.filter(mask)?)
}
