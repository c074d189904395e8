use crate::error::{DashError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column names bucketed by declared dtype, each list in table column order.
///
/// Columns whose dtype fits none of the three kinds (boolean, nested, binary,
/// duration, ...) appear in no list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTypeMap {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub datetime: Vec<String>,
}

impl ColumnTypeMap {
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty() && self.datetime.is_empty()
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        let has = |names: &[String]| names.iter().any(|n| n == column);
        if has(&self.numeric) {
            Some(ColumnKind::Numeric)
        } else if has(&self.categorical) {
            Some(ColumnKind::Categorical)
        } else if has(&self.datetime) {
            Some(ColumnKind::Datetime)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Datetime,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Categorical => "Categorical",
            Self::Datetime => "Datetime",
        }
    }

    /// Kind implied by a declared dtype, without looking at any values.
    pub fn of_dtype(dtype: &DataType) -> Option<Self> {
        if dtype.is_primitive_numeric() {
            Some(Self::Numeric)
        } else if matches!(dtype, DataType::Date | DataType::Datetime(_, _)) {
            Some(Self::Datetime)
        } else if matches!(
            dtype,
            DataType::String | DataType::Categorical(..) | DataType::Enum(..)
        ) {
            Some(Self::Categorical)
        } else {
            None
        }
    }
}

/// JSON has no `NaN`: undefined floats are written as `null` and read back
/// as `NaN`.
mod nan_as_null {
    use serde::{Deserialize as _, Deserializer, Serialize as _, Serializer};

    fn defined(value: f64) -> Option<f64> {
        value.is_finite().then_some(value)
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        defined(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }

    pub mod rows {
        use super::defined;
        use serde::{Deserialize as _, Deserializer, Serialize as _, Serializer};

        pub fn serialize<S: Serializer>(rows: &[Vec<f64>], serializer: S) -> Result<S::Ok, S::Error> {
            let rows: Vec<Vec<Option<f64>>> = rows
                .iter()
                .map(|row| row.iter().map(|v| defined(*v)).collect())
                .collect();
            rows.serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<Vec<f64>>, D::Error> {
            let rows = Vec::<Vec<Option<f64>>>::deserialize(deserializer)?;
            Ok(rows
                .into_iter()
                .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
                .collect())
        }
    }
}

/// Descriptive statistics of one numeric column. Undefined values are `NaN`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct StatsRecord {
    #[serde(with = "nan_as_null")]
    pub mean: f64,
    #[serde(with = "nan_as_null")]
    pub median: f64,
    #[serde(with = "nan_as_null")]
    pub std: f64,
    #[serde(with = "nan_as_null")]
    pub min: f64,
    #[serde(with = "nan_as_null")]
    pub max: f64,
    #[serde(with = "nan_as_null")]
    pub q25: f64,
    #[serde(with = "nan_as_null")]
    pub q75: f64,
}

impl StatsRecord {
    pub const FIELDS: [&'static str; 7] = ["mean", "median", "std", "min", "max", "q25", "q75"];

    pub fn undefined() -> Self {
        Self {
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            q25: f64::NAN,
            q75: f64::NAN,
        }
    }

    pub fn values(&self) -> [f64; 7] {
        [
            self.mean, self.median, self.std, self.min, self.max, self.q25, self.q75,
        ]
    }

    pub fn iqr(&self) -> f64 {
        self.q75 - self.q25
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major coefficients; `NaN` where a pair has no defined correlation.
    #[serde(with = "nan_as_null::rows")]
    pub data: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Coefficient for a pair of columns, `None` if either name is unknown.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let (i, j) = (self.index_of(a)?, self.index_of(b)?);
        self.data.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Square table with a leading `column` label column, for display and export.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new("column".into(), self.columns.clone()));
        for (j, name) in self.columns.iter().enumerate() {
            let values: Vec<f64> = self
                .data
                .iter()
                .map(|row| row.get(j).copied().unwrap_or(f64::NAN))
                .collect();
            columns.push(Column::new(name.as_str().into(), values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Reducer applied per group by [`super::analysis::group_and_aggregate`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregator {
    #[default]
    Sum,
    Mean,
    Count,
    Min,
    Max,
    Median,
}

impl Aggregator {
    pub const ALL: [Self; 6] = [
        Self::Sum,
        Self::Mean,
        Self::Count,
        Self::Min,
        Self::Max,
        Self::Median,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
        }
    }

    /// Whether the value column must be numeric.
    pub fn needs_numeric(&self) -> bool {
        !matches!(self, Self::Count)
    }

    pub(crate) fn apply(&self, expr: Expr) -> Expr {
        match self {
            Self::Sum => expr.sum(),
            Self::Mean => expr.mean(),
            Self::Count => expr.count(),
            Self::Min => expr.min(),
            Self::Max => expr.max(),
            Self::Median => expr.median(),
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregator {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == tag)
            .ok_or_else(|| DashError::Aggregator(s.to_owned()))
    }
}

/// Outlier fence algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    #[default]
    Iqr,
}

impl OutlierMethod {
    /// Multiplier applied to the IQR on both sides of the quartiles.
    pub const IQR_FENCE: f64 = 1.5;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
        }
    }

    /// `None` for unsupported tags; callers decide how to treat those.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "iqr" => Some(Self::Iqr),
            _ => None,
        }
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub record_count: usize,
    pub column_count: usize,
    pub revenue_column: Option<String>,
    pub total_revenue: Option<f64>,
    pub average_revenue: Option<f64>,
    /// Second half of the timeline against the first half, in percent.
    pub growth_pct: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub nulls: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataOverview {
    pub row_count: usize,
    pub column_count: usize,
    pub missing_total: usize,
    pub estimated_bytes: usize,
    pub columns: Vec<ColumnInfo>,
}
