//! Centralized error handling for salesdash.
//!
//! The analysis core distinguishes caller misuse from everything else:
//!
//! - [`DashError::Column`]: a referenced column is absent, or present but of
//!   the wrong kind for the requested operation.
//! - [`DashError::Aggregator`]: an aggregation tag outside the supported set.
//!
//! Both are raised synchronously at the offending call and never retried.
//! Degenerate numeric input (zero variance, a single value, an all-missing
//! column) is *not* an error; those cases resolve to `NaN`.
//!
//! ```
//! use salesdash::error::DashError;
//!
//! fn describe(err: &DashError) -> &'static str {
//!     match err {
//!         DashError::Column { .. } => "bad column",
//!         DashError::Aggregator(_) => "bad aggregator",
//!         _ => "other",
//!     }
//! }
//! ```
//!
//! ## Adding context
//!
//! The `ResultExt` trait adds `.context()` to any `Result` whose error
//! converts into [`DashError`]:
//!
//! ```no_run
//! use salesdash::error::ResultExt as _;
//!
//! fn load_settings() -> salesdash::error::Result<String> {
//!     let text = std::fs::read_to_string("config.json").context("Failed to read settings")?;
//!     Ok(text)
//! }
//! ```

use std::fmt;

/// Main error type for salesdash operations.
#[derive(Debug)]
pub enum DashError {
    /// Referenced column is absent or has the wrong kind.
    Column { name: String, problem: String },

    /// Unsupported aggregation tag.
    Aggregator(String),

    /// I/O errors (file operations)
    Io(std::io::Error),

    /// Data processing errors raised by Polars
    DataProcessing(String),

    /// Configuration errors
    Config(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// Generic error with context
    Other(String),
}

impl DashError {
    pub fn missing_column(name: &str) -> Self {
        Self::Column {
            name: name.to_owned(),
            problem: "not found in table".to_owned(),
        }
    }

    pub fn wrong_kind(name: &str, expected: &str) -> Self {
        Self::Column {
            name: name.to_owned(),
            problem: format!("is not {expected}"),
        }
    }

    /// True for errors caused by invalid arguments rather than data or I/O.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Column { .. } | Self::Aggregator(_))
    }
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column { name, problem } => write!(f, "Column error: '{name}' {problem}"),
            Self::Aggregator(tag) => write!(
                f,
                "Aggregator error: '{tag}' is not one of sum, mean, count, min, max, median"
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DashError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DashError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for DashError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for DashError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

// The dashboard status line only needs the message.
impl From<DashError> for String {
    fn from(err: DashError) -> Self {
        err.to_string()
    }
}

/// Result type alias for salesdash operations.
pub type Result<T> = std::result::Result<T, DashError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<DashError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: DashError = e.into();
            DashError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: DashError = e.into();
            DashError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_error_display() {
        let err = DashError::missing_column("Revenue");
        assert_eq!(err.to_string(), "Column error: 'Revenue' not found in table");

        let err = DashError::wrong_kind("Region", "numeric");
        assert_eq!(err.to_string(), "Column error: 'Region' is not numeric");
    }

    #[test]
    fn test_caller_errors_are_classified() {
        assert!(DashError::Aggregator("avg".to_owned()).is_caller_error());
        assert!(DashError::missing_column("x").is_caller_error());
        assert!(!DashError::Config("bad".to_owned()).is_caller_error());
    }

    #[test]
    fn test_error_conversion_to_string() {
        let s: String = DashError::Aggregator("mode".to_owned()).into();
        assert!(s.starts_with("Aggregator error: 'mode'"));
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "sales.csv",
        ));

        let result: Result<()> = result.context("Failed to read file");
        assert!(
            result
                .expect_err("context keeps the error")
                .to_string()
                .contains("Failed to read file")
        );
    }
}
