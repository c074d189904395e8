use crate::analyser::logic::{CorrelationMatrix, StatsRecord};
use crate::error::{DashError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
    Scatter,
    Heatmap,
    Histogram,
    BoxPlot,
}

impl ChartKind {
    pub const ALL: [Self; 7] = [
        Self::Line,
        Self::Bar,
        Self::Pie,
        Self::Scatter,
        Self::Heatmap,
        Self::Histogram,
        Self::BoxPlot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
            Self::Heatmap => "heatmap",
            Self::Histogram => "histogram",
            Self::BoxPlot => "box_plot",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Bar => "Bar",
            Self::Pie => "Pie",
            Self::Scatter => "Scatter",
            Self::Heatmap => "Correlation heatmap",
            Self::Histogram => "Histogram",
            Self::BoxPlot => "Box plot",
        }
    }

    /// Whether the chart reads a second, numeric column.
    pub fn needs_y(&self) -> bool {
        matches!(
            self,
            Self::Line | Self::Bar | Self::Pie | Self::Scatter | Self::BoxPlot
        )
    }

    pub fn needs_x(&self) -> bool {
        !matches!(self, Self::Heatmap | Self::BoxPlot)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == tag)
            .ok_or_else(|| DashError::Other(format!("Unknown chart kind '{s}'")))
    }
}

/// Row-aligned x values. The variant follows the column's kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum AxisValues {
    Numbers(Vec<Option<f64>>),
    /// Milliseconds since the Unix epoch.
    Timestamps(Vec<Option<i64>>),
    Labels(Vec<Option<String>>),
}

impl AxisValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Numbers(v) => v.len(),
            Self::Timestamps(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub label: String,
    pub stats: StatsRecord,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ChartData {
    Series { x: AxisValues, y: Vec<Option<f64>> },
    Slices { slices: Vec<Slice> },
    Matrix { matrix: CorrelationMatrix },
    Bins { bins: Vec<Bin> },
    Boxes { boxes: Vec<BoxSummary> },
}

/// A renderable chart: what to draw, independent of how it is drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub data: ChartData,
}

impl Chart {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a chart written by [`Chart::to_json`]; `null` statistics come
    /// back as `NaN`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Chart kind plus column selectors, as chosen in the dashboard or on the
/// command line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    pub title: Option<String>,
}
