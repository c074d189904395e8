//! Logging setup for salesdash.
//!
//! Logs go to the console and to daily-rotating files in the platform data
//! directory:
//!
//! - `salesdash.<date>.log`: everything at or above the configured level
//! - `error.<date>.log`: warnings and errors only
//!
//! `RUST_LOG` overrides the configured level. When the log directory or a
//! file appender cannot be set up, logging continues on the console alone.
//!
//! ```no_run
//! salesdash::logging::init("info").expect("Failed to initialize logging");
//! tracing::info!("Dashboard started");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt as _, registry::LookupSpan,
};

const LOG_FILES_KEPT: usize = 10;

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/salesdash/logs`
/// - macOS: `~/Library/Application Support/salesdash/logs`
/// - Linux: `~/.local/share/salesdash/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join("salesdash").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

/// Builds the filter: `RUST_LOG` when set, otherwise `default_level`.
fn env_filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("Invalid log level: {default_level}"))
}

/// Where log output goes after [`init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogOutput {
    ConsoleAndFiles,
    ConsoleOnly,
}

type BoxedSubscriber = Box<dyn tracing::Subscriber + Send + Sync>;

fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(false)
        .compact()
}

fn file_appenders(log_dir: &Path) -> Result<(RollingFileAppender, RollingFileAppender)> {
    let all_logs = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(LOG_FILES_KEPT)
        .filename_prefix("salesdash")
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to create all-logs file appender")?;

    let error_logs = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(LOG_FILES_KEPT)
        .filename_prefix("error")
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to create error-logs file appender")?;

    Ok((all_logs, error_logs))
}

/// Builds the subscriber without installing it.
///
/// The second value is the reason file logging is off, if it is.
fn build_subscriber(
    default_level: &str,
    log_dir: Result<PathBuf>,
) -> Result<(BoxedSubscriber, Option<anyhow::Error>)> {
    let filter = env_filter(default_level)?;

    let (all_logs, error_logs) = match log_dir.and_then(|dir| file_appenders(&dir)) {
        Ok(appenders) => appenders,
        Err(e) => {
            let console_only: BoxedSubscriber = Box::new(
                tracing_subscriber::registry()
                    .with(filter)
                    .with(console_layer()),
            );
            return Ok((console_only, Some(e)));
        }
    };

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs)
        .with_filter(EnvFilter::new("warn"));

    let subscriber: BoxedSubscriber = Box::new(
        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer())
            .with(all_logs_layer)
            .with(error_logs_layer),
    );
    Ok((subscriber, None))
}

/// Initializes console and rotating file logging.
///
/// Falls back to console-only logging, with a warning, when the log
/// directory or the file appenders are unavailable.
///
/// # Errors
///
/// Returns error if `default_level` is not a valid filter directive or a
/// global subscriber is already installed.
pub fn init(default_level: &str) -> Result<LogOutput> {
    let log_dir = get_log_dir();
    let shown_dir = log_dir.as_ref().ok().cloned();
    let (subscriber, file_error) = build_subscriber(default_level, log_dir)?;

    tracing::subscriber::set_global_default(subscriber)
        .context("A global tracing subscriber is already installed")?;

    match (file_error, shown_dir) {
        (None, Some(dir)) => {
            tracing::info!("Logging initialized, log directory: {}", dir.display());
            Ok(LogOutput::ConsoleAndFiles)
        }
        (None, None) => Ok(LogOutput::ConsoleAndFiles),
        (Some(e), _) => {
            tracing::warn!("File logging unavailable, logging to the console only: {e:#}");
            Ok(LogOutput::ConsoleOnly)
        }
    }
}
