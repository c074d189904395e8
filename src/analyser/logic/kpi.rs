//! Headline sales metrics and a data overview for the dashboard.

use super::classify::{classify, numeric_columns};
use super::profiling::{numeric_chunked, require_numeric};
use super::types::{ColumnInfo, DataOverview, KpiSummary};
use crate::error::Result;
use polars::prelude::*;

/// Substrings that mark a column as holding revenue (English and Russian).
const REVENUE_KEYWORDS: [&str; 5] = ["revenue", "sales", "amount", "сумма", "выручка"];

/// First numeric column whose name mentions revenue, sales or amount.
pub fn find_revenue_column(df: &DataFrame) -> Option<String> {
    numeric_columns(df).into_iter().find(|name| {
        let lower = name.to_lowercase();
        REVENUE_KEYWORDS.iter().any(|k| lower.contains(k))
    })
}

pub fn kpi_summary(df: &DataFrame) -> Result<KpiSummary> {
    let revenue_column = find_revenue_column(df);

    let (total_revenue, average_revenue) = match &revenue_column {
        Some(name) => {
            let ca = numeric_chunked(require_numeric(df, name)?)?;
            (ca.sum(), ca.mean())
        }
        None => (None, None),
    };

    let growth_pct = match (&revenue_column, classify(df).datetime.first()) {
        (Some(revenue), Some(date)) => growth_pct(df, date, revenue)?,
        _ => None,
    };

    Ok(KpiSummary {
        record_count: df.height(),
        column_count: df.width(),
        revenue_column,
        total_revenue,
        average_revenue,
        growth_pct,
    })
}

/// Revenue of the later half of the timeline against the earlier half.
///
/// Rows are ordered by `date_column` and split at the middle row. Returns 0
/// when the earlier half does not sum to a positive amount.
pub fn growth_pct(df: &DataFrame, date_column: &str, revenue_column: &str) -> Result<Option<f64>> {
    if df.height() < 2 {
        return Ok(None);
    }

    let sorted = df.sort(
        [date_column],
        SortMultipleOptions::default()
            .with_maintain_order(true)
            .with_nulls_last(true),
    )?;
    let values = numeric_chunked(require_numeric(&sorted, revenue_column)?)?;

    let mid = values.len() / 2;
    let (older, recent) = values.into_iter().enumerate().fold(
        (0.0, 0.0),
        |(older, recent), (i, v)| {
            let v = v.unwrap_or(0.0);
            if i < mid {
                (older + v, recent)
            } else {
                (older, recent + v)
            }
        },
    );

    if older > 0.0 {
        Ok(Some((recent - older) / older * 100.0))
    } else {
        Ok(Some(0.0))
    }
}

/// The `n` rows with the largest values in `column`; missing values sort last.
pub fn top_n(df: &DataFrame, column: &str, n: usize) -> Result<DataFrame> {
    require_numeric(df, column)?;
    let sorted = df.sort(
        [column],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true)
            .with_maintain_order(true),
    )?;
    Ok(sorted.head(Some(n)))
}

pub fn data_overview(df: &DataFrame) -> DataOverview {
    let columns: Vec<ColumnInfo> = df
        .get_columns()
        .iter()
        .map(|c| ColumnInfo {
            name: c.name().to_string(),
            dtype: c.dtype().to_string(),
            nulls: c.null_count(),
        })
        .collect();

    DataOverview {
        row_count: df.height(),
        column_count: df.width(),
        missing_total: columns.iter().map(|c| c.nulls).sum(),
        estimated_bytes: df.estimated_size(),
        columns,
    }
}
