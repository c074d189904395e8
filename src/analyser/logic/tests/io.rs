use super::str_at;
use crate::analyser::logic::io::{to_csv_string, try_parse_temporal_columns};
use crate::analyser::logic::*;
use anyhow::Result;
use polars::prelude::*;

#[test]
fn test_csv_round_trip_keeps_shape() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sales.csv");

    let mut df = df!(
        "region" => &["North", "South", "North"],
        "units" => &[3_i64, 5, 8],
        "revenue" => &[10.5, 20.0, 7.25]
    )?;
    save_df(&mut df, &path)?;

    let loaded = load_df(&path, &LoadOptions::default())?;
    assert_eq!(loaded.shape(), (3, 3));
    let map = classify(&loaded);
    assert_eq!(map.numeric, vec!["units".to_owned(), "revenue".to_owned()]);
    assert_eq!(map.categorical, vec!["region".to_owned()]);
    Ok(())
}

#[test]
fn test_parquet_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sales.parquet");

    let mut df = df!("a" => &[1_i32, 2], "b" => &["x", "y"])?;
    save_df(&mut df, &path)?;

    let loaded = load_df(&path, &LoadOptions::default())?;
    assert!(loaded.equals(&df));
    Ok(())
}

#[test]
fn test_load_csv_parses_dates() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("daily.csv");
    std::fs::write(
        &path,
        "date,revenue\n2024-01-01,100.0\n2024-01-02,120.5\n2024-01-03,90.0\n",
    )?;

    let loaded = load_df(&path, &LoadOptions::default())?;
    assert_eq!(classify(&loaded).datetime, vec!["date".to_owned()]);

    let raw = load_df(
        &path,
        &LoadOptions {
            parse_dates: false,
            ..LoadOptions::default()
        },
    )?;
    assert_eq!(classify(&raw).categorical, vec!["date".to_owned()]);
    Ok(())
}

#[test]
fn test_try_parse_temporal_columns_needs_every_value() -> Result<()> {
    let df = df!(
        "mostly_dates" => &["2024-01-01", "2024-02-01", "soon"],
        "dates" => &[Some("2024-01-01"), None, Some("2024-03-01")],
        "names" => &["alpha", "beta", "gamma"]
    )?;
    let parsed = try_parse_temporal_columns(df)?;

    let mostly = parsed.column("mostly_dates")?;
    assert_eq!(mostly.dtype(), &DataType::String);
    assert_eq!(mostly.null_count(), 0);
    assert_eq!(str_at(&parsed, "mostly_dates", 2)?.as_deref(), Some("soon"));

    let dates = parsed.column("dates")?;
    assert!(matches!(dates.dtype(), DataType::Datetime(_, _)));
    assert_eq!(dates.null_count(), 1);
    assert_eq!(parsed.column("names")?.dtype(), &DataType::String);
    Ok(())
}

#[test]
fn test_load_keeps_text_column_with_one_non_date() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("orders.csv");
    std::fs::write(
        &path,
        "id,note\n1,2024-01-05\n2,2024-01-06\n3,2024-01-07\n4,refund pending\n",
    )?;

    let loaded = load_df(&path, &LoadOptions::default())?;
    assert_eq!(loaded.column("note")?.dtype(), &DataType::String);
    assert_eq!(loaded.column("note")?.null_count(), 0);
    assert_eq!(str_at(&loaded, "note", 3)?.as_deref(), Some("refund pending"));
    Ok(())
}

#[test]
fn test_load_rejects_unknown_extension() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello")?;

    let err = load_df(&path, &LoadOptions::default()).expect_err("txt is not supported");
    assert!(err.to_string().contains("Unsupported file extension"));
    Ok(())
}

#[test]
fn test_load_missing_file() {
    let path = std::path::Path::new("/definitely/not/here.parquet");
    assert!(load_df(path, &LoadOptions::default()).is_err());
}

#[test]
fn test_to_csv_string() -> Result<()> {
    let mut df = df!("a" => &[1_i32, 2], "b" => &["x", "y"])?;
    let csv = to_csv_string(&mut df)?;
    assert_eq!(csv, "a,b\n1,x\n2,y\n");
    Ok(())
}
