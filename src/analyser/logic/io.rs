use crate::error::DashError;
use anyhow::{Context as _, Result};
use calamine::{Data, Reader as _, open_workbook_auto};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Rows scanned to infer CSV column types.
    pub infer_schema_length: usize,
    /// Try to parse text columns as datetimes after loading.
    pub parse_dates: bool,
    /// Worksheet to read from a workbook; the first sheet when `None`.
    pub sheet: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: 10_000,
            parse_dates: true,
            sheet: None,
        }
    }
}

pub const SUPPORTED_EXTENSIONS: [&str; 8] =
    ["csv", "xlsx", "xls", "xlsm", "xlsb", "ods", "parquet", "json"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn load_df(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let ext = extension_of(path);
    if !path.is_file() {
        return Err(DashError::InvalidPath(format!("{} is not a file", path.display())).into());
    }

    let df = match ext.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(options.infer_schema_length))
            .with_has_header(true)
            .with_try_parse_dates(options.parse_dates)
            .finish()?
            .collect()
            .context("Failed to read CSV")?,
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => {
            read_workbook(path, options.sheet.as_deref()).context("Failed to read workbook")?
        }
        "parquet" => ParquetReader::new(std::fs::File::open(path)?)
            .finish()
            .context("Failed to read Parquet")?,
        "json" => JsonReader::new(std::fs::File::open(path)?)
            .finish()
            .context("Failed to read JSON")?,
        _ => {
            return Err(
                DashError::InvalidPath(format!("Unsupported file extension: {ext}")).into(),
            );
        }
    };

    let df = if options.parse_dates {
        try_parse_temporal_columns(df)?
    } else {
        df
    };

    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Loaded table"
    );
    Ok(df)
}

/// Converts text columns to `Datetime` when every present value parses.
///
/// Nulls stay null. A column with any value that does not parse is left as
/// text, so loading never loses data.
pub fn try_parse_temporal_columns(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let candidates: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect();

    for name in candidates {
        let column = df.column(&name)?.clone();
        let missing = column.null_count();
        if missing == column.len() {
            continue;
        }
        let options = StrptimeOptions {
            strict: false,
            ..Default::default()
        };
        let parsed = DataFrame::new(vec![column])?
            .lazy()
            .select([col(name.as_str()).str().to_datetime(
                Some(TimeUnit::Milliseconds),
                None,
                options,
                lit("raise"),
            )])
            .collect();
        // Text with no recognisable date format stays text.
        let Ok(parsed) = parsed else {
            continue;
        };
        let casted = parsed.column(&name)?.as_materialized_series().clone();
        // One unparseable value keeps the whole column as text.
        if casted.null_count() == missing {
            df.replace(&name, casted)?;
        }
    }
    Ok(df)
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;

    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .with_context(|| format!("Failed to read sheet '{name}'"))?,
        None => workbook
            .worksheet_range_at(0)
            .context("Workbook has no sheets")?
            .context("Failed to read the first sheet")?,
    };

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let names = header_names(header);
    let body: Vec<&[Data]> = rows.collect();

    let columns = names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(j).unwrap_or(&Data::Empty))
                .collect();
            workbook_column(name, &cells)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DataFrame::new(columns)?)
}

/// Header cells as unique column names; blanks become `column_{n}`.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell {
                Data::Empty => format!("column_{}", i + 1),
                other => other.to_string().trim().to_owned(),
            };
            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    DateTime,
    Bool,
    Text,
}

fn cell_kind(cell: &Data) -> Option<CellKind> {
    match cell {
        Data::Empty => None,
        Data::Int(_) => Some(CellKind::Int),
        Data::Float(_) => Some(CellKind::Float),
        Data::DateTime(_) => Some(CellKind::DateTime),
        Data::Bool(_) => Some(CellKind::Bool),
        _ => Some(CellKind::Text),
    }
}

/// Narrowest kind that holds every non-empty cell.
fn column_kind(cells: &[&Data]) -> Option<CellKind> {
    cells
        .iter()
        .filter_map(|c| cell_kind(c))
        .try_fold(None, |acc: Option<CellKind>, kind| match (acc, kind) {
            (None, k) => Some(Some(k)),
            (Some(a), k) if a == k => Some(Some(a)),
            (Some(CellKind::Int | CellKind::Float), CellKind::Int | CellKind::Float) => {
                Some(Some(CellKind::Float))
            }
            _ => None,
        })
        .unwrap_or(Some(CellKind::Text))
}

fn workbook_column(name: &str, cells: &[&Data]) -> Result<Column> {
    let series = match column_kind(cells) {
        // An empty column reads as all-missing numbers.
        None => Series::new(name.into(), vec![None::<f64>; cells.len()]),
        Some(CellKind::Int) => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        Some(CellKind::Float) => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(v) => Some(*v as f64),
                    Data::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        Some(CellKind::DateTime) => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Data::DateTime(dt) => dt.as_datetime().map(|d| d.and_utc().timestamp_millis()),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        Some(CellKind::Bool) => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Data::Bool(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        Some(CellKind::Text) => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|c| match c {
                    Data::Empty => None,
                    other => Some(other.to_string()),
                })
                .collect();
            Series::new(name.into(), values)
        }
    };
    Ok(Column::from(series))
}

pub fn save_df(df: &mut DataFrame, path: &Path) -> Result<()> {
    let ext = extension_of(path);

    if ext.as_str() == "parquet" {
        let file = std::fs::File::create(path).context("Failed to create Parquet file")?;
        ParquetWriter::new(file)
            .finish(df)
            .context("Failed to write Parquet file")?;
    } else {
        let file = std::fs::File::create(path).context("Failed to create CSV file")?;
        CsvWriter::new(file)
            .include_header(true)
            .finish(df)
            .context("Failed to write CSV file")?;
    }

    tracing::info!(path = %path.display(), rows = df.height(), "Saved table");
    Ok(())
}

/// CSV text of a table, for clipboard-style exports.
pub fn to_csv_string(df: &mut DataFrame) -> Result<String> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(df)
        .context("Failed to encode CSV")?;
    String::from_utf8(buf).context("CSV output was not UTF-8")
}
