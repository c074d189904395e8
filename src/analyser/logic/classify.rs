//! Column type classification.
//!
//! Classification is purely declarative: it reads each column's declared
//! dtype and never samples values, so a text column holding only digit
//! strings stays categorical.

use super::types::{ColumnKind, ColumnTypeMap};
use polars::prelude::*;

pub fn classify(df: &DataFrame) -> ColumnTypeMap {
    let mut types = ColumnTypeMap::default();

    for col in df.get_columns() {
        let name = col.name().to_string();
        match ColumnKind::of_dtype(col.dtype()) {
            Some(ColumnKind::Numeric) => types.numeric.push(name),
            Some(ColumnKind::Categorical) => types.categorical.push(name),
            Some(ColumnKind::Datetime) => types.datetime.push(name),
            None => {}
        }
    }

    tracing::debug!(
        numeric = types.numeric.len(),
        categorical = types.categorical.len(),
        datetime = types.datetime.len(),
        "Classified {} columns",
        df.width()
    );

    types
}

/// Names of the numeric columns, in table order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| ColumnKind::of_dtype(c.dtype()) == Some(ColumnKind::Numeric))
        .map(|c| c.name().to_string())
        .collect()
}
