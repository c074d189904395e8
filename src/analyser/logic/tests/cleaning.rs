use super::{f64_at, row_keys, str_at};
use crate::analyser::logic::*;
use anyhow::Result;
use polars::prelude::*;
use std::collections::HashSet;

#[test]
fn test_clean_df_dedups_then_imputes_median() -> Result<()> {
    let df = df!(
        "A" => &[1.0, 2.0, f64::NAN, 4.0, 4.0],
        "B" => &["x", "y", "z", "x", "x"]
    )?;

    let cleaned = clean_df(&df)?;
    assert_eq!(cleaned.height(), 4);
    assert_eq!(cleaned.column("A")?.null_count(), 0);
    // Median of the deduplicated values 1, 2, 4.
    assert!((f64_at(&cleaned, "A", 2)? - 2.0).abs() < 1e-12);
    assert_eq!(str_at(&cleaned, "B", 2)?.as_deref(), Some("z"));
    Ok(())
}

#[test]
fn test_clean_df_leaves_input_untouched() -> Result<()> {
    let df = df!(
        "A" => &[Some(1.0), None, Some(3.0)],
        "B" => &["x", "y", "z"]
    )?;
    let _cleaned = clean_df(&df)?;
    assert_eq!(df.column("A")?.null_count(), 1);
    assert_eq!(df.height(), 3);
    Ok(())
}

#[test]
fn test_clean_df_removes_duplicates_created_by_imputation() -> Result<()> {
    let df = df!(
        "A" => &[Some(1.0), None, Some(3.0), Some(2.0)],
        "B" => &["x", "x", "y", "x"]
    )?;

    let cleaned = clean_df(&df)?;
    // The gap becomes 2.0, which makes row 1 equal to row 3.
    assert_eq!(cleaned.height(), 3);
    let keys = row_keys(&cleaned)?;
    assert_eq!(keys.iter().collect::<HashSet<_>>().len(), keys.len());
    Ok(())
}

#[test]
fn test_clean_df_is_idempotent() -> Result<()> {
    let df = df!(
        "A" => &[Some(1.0), None, Some(3.0), Some(2.0), None],
        "n" => &[Some(1_i64), Some(1), None, Some(4), Some(1)],
        "B" => &["x", "x", "y", "x", "x"]
    )?;

    let once = clean_df(&df)?;
    let twice = clean_df(&once)?;
    assert!(once.equals_missing(&twice));
    Ok(())
}

#[test]
fn test_clean_df_keeps_gap_free_integers() -> Result<()> {
    let df = df!(
        "qty" => &[1_i64, 2, 3],
        "price" => &[Some(1.0), None, Some(3.0)]
    )?;
    let cleaned = clean_df(&df)?;
    assert_eq!(cleaned.column("qty")?.dtype(), &DataType::Int64);
    assert_eq!(cleaned.column("price")?.null_count(), 0);
    Ok(())
}

#[test]
fn test_clean_df_all_missing_column_stays_missing() -> Result<()> {
    let df = df!(
        "empty" => &[None::<f64>, None],
        "label" => &["a", "b"]
    )?;
    let cleaned = clean_df(&df)?;
    assert_eq!(cleaned.height(), 2);
    assert_eq!(cleaned.column("empty")?.null_count(), 2);
    Ok(())
}

#[test]
fn test_clean_df_does_not_fill_text() -> Result<()> {
    let df = df!(
        "region" => &[Some("North"), None, Some("South")],
        "units" => &[1.0, 2.0, 3.0]
    )?;
    let cleaned = clean_df(&df)?;
    assert_eq!(cleaned.column("region")?.null_count(), 1);
    Ok(())
}

#[test]
fn test_clean_df_empty_table() -> Result<()> {
    let df = DataFrame::empty();
    assert_eq!(clean_df(&df)?.height(), 0);
    Ok(())
}

#[test]
fn test_numeric_columns_with_gaps() -> Result<()> {
    let df = df!(
        "full" => &[1.0, 2.0],
        "nan" => &[1.0, f64::NAN],
        "null" => &[Some(1_i32), None],
        "text" => &[None::<&str>, Some("a")]
    )?;
    assert_eq!(
        numeric_columns_with_gaps(&df),
        vec!["nan".to_owned(), "null".to_owned()]
    );
    assert!(numeric_columns_with_gaps(&clean_df(&df)?).is_empty());
    Ok(())
}
