//! # Salesdash - sales analytics over tabular data
//!
//! Salesdash loads a sales table (CSV, Excel/ODS, Parquet or JSON, or a
//! generated demo dataset), classifies its columns, cleans it, computes
//! statistics and aggregates, and turns the results into charts. The same
//! core drives an eframe dashboard and a command-line interface.
//!
//! ## Quick Start
//!
//! ```no_run
//! use salesdash::analyser::logic::{Aggregator, basic_stats, clean_df, group_and_aggregate, load_df};
//! use salesdash::charts::bar_chart;
//!
//! # fn example() -> anyhow::Result<()> {
//! let df = load_df("sales.csv".as_ref(), &Default::default())?;
//! let cleaned = clean_df(&df)?;
//!
//! let stats = basic_stats(&cleaned, "Revenue")?;
//! println!("median revenue: {}", stats.median);
//!
//! let by_region = group_and_aggregate(&cleaned, "Region", "Revenue", Aggregator::Sum)?;
//! let chart = bar_chart(&by_region, "Region", "Revenue", None)?;
//! println!("{}", chart.title); // "Revenue by Region"
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser`]: loading, column classification, cleaning, statistics,
//!   grouping, outliers and KPIs
//! - [`charts`]: chart descriptions built from a table
//! - [`demo`]: seeded synthetic sales, monthly and product tables
//! - [`gui`]: the eframe dashboard
//! - [`config`]: persisted dashboard settings
//! - [`error`]: the [`error::DashError`] type shared by the library
//! - [`logging`]: tracing setup with a daily rolling log file
//!
//! ## Missing values
//!
//! Null and `NaN` both count as missing. Statistics skip them, the cleaner
//! fills them in numeric columns, and outlier detection never flags them.

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod charts;
pub mod config;
pub mod demo;
pub mod error;
pub mod gui;
pub mod logging;
pub mod theme;
pub mod utils;
