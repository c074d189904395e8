//! Table analysis: loading, classification, cleaning, statistics and KPIs.
//!
//! All of it lives in [`logic`], which has no GUI dependencies so the CLI and
//! tests can drive it directly.

pub mod logic;
