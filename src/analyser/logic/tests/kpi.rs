use super::{datetime_column, f64_at};
use crate::analyser::logic::kpi::growth_pct;
use crate::analyser::logic::*;
use anyhow::Result;
use polars::prelude::*;

const DAY_MS: i64 = 86_400_000;

#[test]
fn test_find_revenue_column() -> Result<()> {
    let df = df!(
        "region" => &["North"],
        "units" => &[1_i64],
        "Total_Sales" => &[10.0],
        "revenue" => &[5.0]
    )?;
    assert_eq!(find_revenue_column(&df).as_deref(), Some("Total_Sales"));

    let df = df!("Выручка" => &[1.0])?;
    assert_eq!(find_revenue_column(&df).as_deref(), Some("Выручка"));

    // Text columns never count, whatever their name.
    let df = df!("sales_rep" => &["Ann"], "units" => &[1_i64])?;
    assert_eq!(find_revenue_column(&df), None);
    Ok(())
}

#[test]
fn test_kpi_summary_with_growth() -> Result<()> {
    // Rows are out of date order on purpose.
    let mut df = df!(
        "region" => &["N", "S", "N", "S"],
        "revenue" => &[150.0, 100.0, 150.0, 100.0]
    )?;
    df.with_column(datetime_column(
        "date",
        vec![3 * DAY_MS, 0, 2 * DAY_MS, DAY_MS],
    )?)?;

    let kpi = kpi_summary(&df)?;
    assert_eq!(kpi.record_count, 4);
    assert_eq!(kpi.column_count, 3);
    assert_eq!(kpi.revenue_column.as_deref(), Some("revenue"));
    assert_eq!(kpi.total_revenue, Some(500.0));
    assert_eq!(kpi.average_revenue, Some(125.0));
    // 300 against 200.
    assert!(kpi.growth_pct.is_some_and(|g| (g - 50.0).abs() < 1e-9));
    Ok(())
}

#[test]
fn test_kpi_summary_without_revenue_or_dates() -> Result<()> {
    let df = df!("region" => &["N", "S"], "units" => &[1_i64, 2])?;
    let kpi = kpi_summary(&df)?;
    assert_eq!(kpi.revenue_column, None);
    assert_eq!(kpi.total_revenue, None);
    assert_eq!(kpi.growth_pct, None);

    let df = df!("revenue" => &[1.0, 2.0])?;
    let kpi = kpi_summary(&df)?;
    assert_eq!(kpi.total_revenue, Some(3.0));
    assert_eq!(kpi.growth_pct, None);
    Ok(())
}

#[test]
fn test_growth_pct_edge_cases() -> Result<()> {
    let mut df = df!("revenue" => &[0.0, 0.0, 5.0, 5.0])?;
    df.with_column(datetime_column("date", vec![0, DAY_MS, 2 * DAY_MS, 3 * DAY_MS])?)?;
    assert_eq!(growth_pct(&df, "date", "revenue")?, Some(0.0));

    let short = df.head(Some(1));
    assert_eq!(growth_pct(&short, "date", "revenue")?, None);
    Ok(())
}

#[test]
fn test_top_n() -> Result<()> {
    let df = df!(
        "product" => &["a", "b", "c", "d"],
        "revenue" => &[Some(5.0), None, Some(9.0), Some(7.0)]
    )?;
    let top = top_n(&df, "revenue", 3)?;
    assert_eq!(top.height(), 3);
    assert!((f64_at(&top, "revenue", 0)? - 9.0).abs() < 1e-12);
    assert!((f64_at(&top, "revenue", 2)? - 5.0).abs() < 1e-12);

    assert_eq!(top_n(&df, "revenue", 10)?.height(), 4);
    assert!(top_n(&df, "product", 2).is_err());
    Ok(())
}

#[test]
fn test_data_overview() -> Result<()> {
    let df = df!(
        "a" => &[Some(1.0), None, None],
        "b" => &[Some("x"), Some("y"), None]
    )?;
    let overview = data_overview(&df);
    assert_eq!(overview.row_count, 3);
    assert_eq!(overview.column_count, 2);
    assert_eq!(overview.missing_total, 3);
    assert_eq!(overview.columns.len(), 2);
    assert_eq!(overview.columns[0].name, "a");
    assert_eq!(overview.columns[0].nulls, 2);
    assert!(overview.estimated_bytes > 0);
    Ok(())
}
