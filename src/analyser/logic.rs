//! The analytical core: column classification, cleaning, statistics,
//! aggregation and outlier detection over polars `DataFrame`s.
//!
//! Everything here is synchronous and stateless. Read-only operations take
//! `&DataFrame`; [`clean_df`] returns a new frame.

pub mod analysis;
pub mod classify;
pub mod cleaning;
pub mod io;
pub mod kpi;
pub mod profiling;
pub mod types;

pub use analysis::{
    basic_stats, calculate_correlation, describe, detect_outliers, filter_rows,
    group_and_aggregate, group_and_aggregate_by_tag,
};
pub use classify::{classify, numeric_columns};
pub use cleaning::{clean_df, numeric_columns_with_gaps};
pub use io::{LoadOptions, load_df, save_df};
pub use kpi::{data_overview, find_revenue_column, kpi_summary, top_n};
pub use types::{
    Aggregator, ColumnInfo, ColumnKind, ColumnTypeMap, CorrelationMatrix, DataOverview,
    KpiSummary, OutlierMethod, StatsRecord,
};
