//! Chart builders.
//!
//! Each constructor validates its columns, pulls row-aligned values out of
//! the table and returns a [`Chart`]. Rendering lives in the dashboard; the
//! CLI writes charts out as JSON.

mod model;

pub use model::{AxisValues, Bin, BoxSummary, Chart, ChartData, ChartKind, ChartRequest, Slice};

use crate::analyser::logic::profiling::{
    calculate_histogram, label_values, numeric_chunked, numeric_values, require_column,
    require_numeric, timestamp_values,
};
use crate::analyser::logic::{
    Aggregator, ColumnKind, basic_stats, calculate_correlation, group_and_aggregate,
};
use crate::error::{DashError, Result};
use polars::prelude::*;

/// Label used for a missing category.
pub const MISSING_LABEL: &str = "(missing)";

fn title_or(title: Option<&str>, default: impl FnOnce() -> String) -> String {
    title.map_or_else(default, str::to_owned)
}

/// Row-aligned values of an x column, typed by the column's kind.
pub fn axis_values(df: &DataFrame, column: &str) -> Result<AxisValues> {
    let col = require_column(df, column)?;
    Ok(match ColumnKind::of_dtype(col.dtype()) {
        Some(ColumnKind::Numeric) => {
            AxisValues::Numbers(numeric_chunked(col)?.into_iter().collect())
        }
        Some(ColumnKind::Datetime) => AxisValues::Timestamps(timestamp_values(col)?),
        _ => AxisValues::Labels(label_values(col)?),
    })
}

fn xy_chart(kind: ChartKind, df: &DataFrame, x: &str, y: &str, title: String) -> Result<Chart> {
    let y_values = numeric_values(df, y)?;
    let x_values = axis_values(df, x)?;
    tracing::debug!(%kind, x, y, points = y_values.len(), "Built chart");
    Ok(Chart {
        kind,
        title,
        x_label: Some(x.to_owned()),
        y_label: Some(y.to_owned()),
        data: ChartData::Series {
            x: x_values,
            y: y_values,
        },
    })
}

pub fn line_chart(df: &DataFrame, x: &str, y: &str, title: Option<&str>) -> Result<Chart> {
    let title = title_or(title, || format!("{y} over {x}"));
    xy_chart(ChartKind::Line, df, x, y, title)
}

pub fn bar_chart(df: &DataFrame, x: &str, y: &str, title: Option<&str>) -> Result<Chart> {
    let title = title_or(title, || format!("{y} by {x}"));
    xy_chart(ChartKind::Bar, df, x, y, title)
}

pub fn scatter_plot(df: &DataFrame, x: &str, y: &str, title: Option<&str>) -> Result<Chart> {
    let title = title_or(title, || format!("{y} vs {x}"));
    xy_chart(ChartKind::Scatter, df, x, y, title)
}

/// One slice per distinct name, summing repeated names in first-seen order.
pub fn pie_chart(df: &DataFrame, names: &str, values: &str, title: Option<&str>) -> Result<Chart> {
    let title = title_or(title, || format!("Distribution of {values}"));
    let summed = group_and_aggregate(df, names, values, Aggregator::Sum)?;

    let cols = summed.get_columns();
    let (Some(keys), Some(totals)) = (cols.first(), cols.get(1)) else {
        return Err(DashError::DataProcessing(
            "aggregation returned no columns".to_owned(),
        ));
    };
    let totals = numeric_chunked(totals)?;
    let slices = label_values(keys)?
        .into_iter()
        .zip(&totals)
        .map(|(label, value)| Slice {
            label: label.unwrap_or_else(|| MISSING_LABEL.to_owned()),
            value: value.unwrap_or(0.0),
        })
        .collect();

    Ok(Chart {
        kind: ChartKind::Pie,
        title,
        x_label: Some(names.to_owned()),
        y_label: Some(values.to_owned()),
        data: ChartData::Slices { slices },
    })
}

/// Correlation over every numeric column.
pub fn correlation_heatmap(df: &DataFrame, title: Option<&str>) -> Result<Chart> {
    let matrix = calculate_correlation(df, None)?;
    Ok(Chart {
        kind: ChartKind::Heatmap,
        title: title_or(title, || "Correlation Heatmap".to_owned()),
        x_label: None,
        y_label: None,
        data: ChartData::Matrix { matrix },
    })
}

pub fn histogram(df: &DataFrame, column: &str, title: Option<&str>) -> Result<Chart> {
    let ca = numeric_chunked(require_numeric(df, column)?)?;
    let (width, counts) = calculate_histogram(&ca);
    let bins = counts
        .into_iter()
        .map(|(start, count)| Bin {
            start,
            width,
            count,
        })
        .collect();

    Ok(Chart {
        kind: ChartKind::Histogram,
        title: title_or(title, || format!("Histogram of {column}")),
        x_label: Some(column.to_owned()),
        y_label: Some("count".to_owned()),
        data: ChartData::Bins { bins },
    })
}

/// Quartile summary of `value`, one box per group when `group` is given.
pub fn box_plot(
    df: &DataFrame,
    value: &str,
    group: Option<&str>,
    title: Option<&str>,
) -> Result<Chart> {
    require_numeric(df, value)?;

    let boxes = match group {
        None => vec![BoxSummary {
            label: value.to_owned(),
            stats: basic_stats(df, value)?,
        }],
        Some(group) => {
            let labels = label_values(require_column(df, group)?)?;
            let values = numeric_values(df, value)?;

            let mut groups: Vec<(String, Vec<Option<f64>>)> = Vec::new();
            for (label, v) in labels.into_iter().zip(values) {
                let label = label.unwrap_or_else(|| MISSING_LABEL.to_owned());
                match groups.iter_mut().find(|(l, _)| *l == label) {
                    Some((_, members)) => members.push(v),
                    None => groups.push((label, vec![v])),
                }
            }

            groups
                .into_iter()
                .map(|(label, members)| {
                    let part = DataFrame::new(vec![Column::new(value.into(), members)])?;
                    Ok(BoxSummary {
                        label,
                        stats: basic_stats(&part, value)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    let title = title_or(title, || match group {
        Some(group) => format!("Distribution of {value} by {group}"),
        None => format!("Distribution of {value}"),
    });
    Ok(Chart {
        kind: ChartKind::BoxPlot,
        title,
        x_label: group.map(str::to_owned),
        y_label: Some(value.to_owned()),
        data: ChartData::Boxes { boxes },
    })
}

fn required<'a>(field: Option<&'a str>, role: &str, kind: ChartKind) -> Result<&'a str> {
    field.ok_or_else(|| DashError::Other(format!("A {kind} chart needs the {role} column")))
}

/// Builds the chart a [`ChartRequest`] describes.
///
/// A bar chart over a categorical x column is drawn from the per-category
/// sums rather than from every row.
pub fn build_chart(df: &DataFrame, request: &ChartRequest) -> Result<Chart> {
    let kind = request.kind;
    let x = request.x.as_deref();
    let y = request.y.as_deref();
    let title = request.title.as_deref();

    match kind {
        ChartKind::Line => line_chart(df, required(x, "x", kind)?, required(y, "y", kind)?, title),
        ChartKind::Scatter => {
            scatter_plot(df, required(x, "x", kind)?, required(y, "y", kind)?, title)
        }
        ChartKind::Pie => pie_chart(
            df,
            required(x, "name", kind)?,
            required(y, "value", kind)?,
            title,
        ),
        ChartKind::Bar => {
            let (x, y) = (required(x, "x", kind)?, required(y, "y", kind)?);
            require_numeric(df, y)?;
            let x_kind = ColumnKind::of_dtype(require_column(df, x)?.dtype());
            if x_kind == Some(ColumnKind::Categorical) {
                let summed = group_and_aggregate(df, x, y, Aggregator::Sum)?;
                bar_chart(&summed, x, y, title)
            } else {
                bar_chart(df, x, y, title)
            }
        }
        ChartKind::Heatmap => correlation_heatmap(df, title),
        ChartKind::Histogram => histogram(df, required(x, "value", kind)?, title),
        ChartKind::BoxPlot => box_plot(df, required(y, "value", kind)?, x, title),
    }
}
