//! End-to-end runs over the fixture files in `testdata/`.
//!
//! Each test loads a real file through the loader, pushes it through the
//! analysis and chart code, and checks the figures against hand-computed
//! values.

#![expect(clippy::unwrap_used, clippy::indexing_slicing)]

use anyhow::Result;
use polars::prelude::*;
use salesdash::analyser::logic::{
    Aggregator, LoadOptions, basic_stats, calculate_correlation, classify, clean_df,
    detect_outliers, filter_rows, group_and_aggregate, kpi_summary, load_df, save_df, top_n,
};
use salesdash::charts::{AxisValues, ChartData, ChartKind, ChartRequest, bar_chart, build_chart};
use salesdash::demo::DemoDataset;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

fn load_sales() -> Result<DataFrame> {
    load_df(&fixture("sales.csv"), &LoadOptions::default())
}

#[test]
fn test_load_and_classify_sales_csv() -> Result<()> {
    let df = load_sales()?;
    assert_eq!(df.height(), 10, "Should have 10 rows");
    assert_eq!(df.width(), 5, "Should have 5 columns");

    let types = classify(&df);
    assert_eq!(types.numeric, vec!["Units", "Revenue"]);
    assert_eq!(types.categorical, vec!["Region", "Product"]);
    assert_eq!(types.datetime, vec!["Date"]);
    Ok(())
}

#[test]
fn test_revenue_by_region() -> Result<()> {
    let df = load_sales()?;
    let grouped = group_and_aggregate(&df, "Region", "Revenue", Aggregator::Sum)?;

    let regions: Vec<&str> = grouped
        .column("Region")?
        .as_materialized_series()
        .str()?
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(regions, ["North", "South", "East", "West"], "First-seen order");

    let totals: Vec<f64> = grouped
        .column("Revenue")?
        .as_materialized_series()
        .f64()?
        .into_iter()
        .flatten()
        .collect();
    let expected = [3540.0, 9725.5, 1680.0, 2500.4];
    for (got, want) in totals.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "{got} != {want}");
    }
    Ok(())
}

#[test]
fn test_revenue_outlier_is_the_big_order() -> Result<()> {
    let df = load_sales()?;
    let mask = detect_outliers(&df, "Revenue", "iqr")?;
    let flagged = filter_rows(&df, &mask)?;

    assert_eq!(flagged.height(), 1);
    let revenue = flagged.column("Revenue")?.as_materialized_series().f64()?.get(0);
    assert_eq!(revenue, Some(9000.0));
    Ok(())
}

#[test]
fn test_stats_and_correlation_on_file() -> Result<()> {
    let df = load_sales()?;

    let stats = basic_stats(&df, "Units")?;
    assert!((stats.mean - 3.8).abs() < 1e-9);
    assert!((stats.median - 3.0).abs() < 1e-9);
    assert!((stats.min - 1.0).abs() < f64::EPSILON);
    assert!((stats.max - 10.0).abs() < f64::EPSILON);

    let matrix = calculate_correlation(&df, None)?;
    assert_eq!(matrix.columns, vec!["Units", "Revenue"]);
    let r = matrix.get("Units", "Revenue").unwrap();
    assert!(r > 0.5 && r <= 1.0, "Units and revenue move together ({r})");
    assert_eq!(matrix.get("Revenue", "Units"), Some(r));
    Ok(())
}

#[test]
fn test_kpis_from_file() -> Result<()> {
    let df = load_sales()?;
    let kpi = kpi_summary(&df)?;

    assert_eq!(kpi.record_count, 10);
    assert_eq!(kpi.revenue_column.as_deref(), Some("Revenue"));

    let total = kpi.total_revenue.unwrap();
    assert!((total - 17_445.9).abs() < 1e-6);

    let first_half = 2400.0 + 125.5 + 1200.0 + 900.0 + 100.4;
    let second_half = 600.0 + 480.0 + 240.0 + 2400.0 + 9000.0;
    let expected = (second_half - first_half) / first_half * 100.0;
    assert!((kpi.growth_pct.unwrap() - expected).abs() < 1e-9);

    let top = top_n(&df, "Revenue", 3)?;
    assert_eq!(top.height(), 3);
    assert_eq!(
        top.column("Revenue")?.as_materialized_series().f64()?.get(0),
        Some(9000.0)
    );
    Ok(())
}

#[test]
fn test_clean_missing_values_and_save() -> Result<()> {
    let df = load_df(&fixture("missing_values.csv"), &LoadOptions::default())?;
    assert_eq!(df.height(), 5);
    assert!(df.column("units")?.null_count() > 0);

    let mut cleaned = clean_df(&df)?;
    assert_eq!(cleaned.height(), 4, "Duplicate order row is dropped");
    assert_eq!(cleaned.column("units")?.null_count(), 0);
    assert_eq!(cleaned.column("price")?.null_count(), 0);

    let units = cleaned.column("units")?.cast(&DataType::Float64)?;
    assert_eq!(units.as_materialized_series().f64()?.get(1), Some(4.0), "Median of 2, 4, 6");
    let price = cleaned.column("price")?.as_materialized_series().f64()?.get(2);
    assert_eq!(price, Some(20.0), "Median of 10, 20, 30");

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cleaned.csv");
    save_df(&mut cleaned, &path)?;

    let reloaded = load_df(&path, &LoadOptions::default())?;
    assert_eq!(reloaded.shape(), cleaned.shape());
    assert_eq!(reloaded.column("units")?.null_count(), 0);
    Ok(())
}

#[test]
fn test_charts_from_file() -> Result<()> {
    let df = load_sales()?;

    let line = build_chart(
        &df,
        &ChartRequest {
            kind: ChartKind::Line,
            x: Some("Date".to_owned()),
            y: Some("Revenue".to_owned()),
            title: None,
        },
    )?;
    assert_eq!(line.title, "Revenue over Date");
    let ChartData::Series { x, y } = &line.data else {
        panic!("Line chart should carry series data");
    };
    assert!(matches!(x, AxisValues::Timestamps(_)), "Dates plot as timestamps");
    assert_eq!(y.len(), 10);

    let grouped = group_and_aggregate(&df, "Region", "Revenue", Aggregator::Sum)?;
    let bars = bar_chart(&grouped, "Region", "Revenue", None)?;
    assert_eq!(bars.title, "Revenue by Region");

    let json = bars.to_json()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["kind"], "bar");
    Ok(())
}

#[test]
fn test_demo_dataset_parquet_round_trip() -> Result<()> {
    let mut df = DemoDataset::Monthly.generate(0, 7)?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("monthly.parquet");

    save_df(&mut df, &path)?;
    let reloaded = load_df(&path, &LoadOptions::default())?;
    assert!(reloaded.equals(&df), "Parquet keeps values and dtypes");
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let result = load_df(&fixture("does_not_exist.csv"), &LoadOptions::default());
    assert!(result.is_err(), "Loading a missing file should fail");
}
