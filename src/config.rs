use crate::analyser::logic::{Aggregator, LoadOptions, OutlierMethod};
use crate::demo::{DEFAULT_RECORDS, DEFAULT_SEED};
use crate::error::DashError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_LOG_LEVEL: &str = "SALESDASH_LOG_LEVEL";
pub const ENV_PREVIEW_ROWS: &str = "SALESDASH_PREVIEW_ROWS";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Aggregator preselected for group-by (default: sum)
    pub default_aggregator: Aggregator,
    pub outlier_method: OutlierMethod,
    /// Records in the generated sales demo (default: 2000)
    pub demo_records: usize,
    pub demo_seed: u64,
    /// Rows scanned to infer CSV column types (default: 10000)
    pub csv_infer_schema_length: usize,
    /// Maximum number of rows shown in table previews (default: 100)
    pub preview_row_limit: usize,
    /// Console and file log level unless `RUST_LOG` is set
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_aggregator: Aggregator::default(),
            outlier_method: OutlierMethod::default(),
            demo_records: DEFAULT_RECORDS,
            demo_seed: DEFAULT_SEED,
            csv_infer_schema_length: 10_000,
            preview_row_limit: 100,
            log_level: "info".to_owned(),
        }
    }
}

impl DashboardConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            infer_schema_length: self.csv_infer_schema_length,
            ..LoadOptions::default()
        }
    }

    /// Applies `SALESDASH_*` overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|l| !l.trim().is_empty()) {
            self.log_level = level.trim().to_owned();
        }
        if let Some(rows) = lookup(ENV_PREVIEW_ROWS) {
            match rows.trim().parse() {
                Ok(n) => self.preview_row_limit = n,
                Err(e) => {
                    let err = DashError::Config(format!("{ENV_PREVIEW_ROWS}={rows}: {e}"));
                    tracing::warn!("Ignoring override. {err}");
                }
            }
        }
    }
}

pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("salesdash")
        .join("config.json")
}

/// Reads the config at `path`, falling back to defaults when it is missing
/// or unreadable.
pub fn load_config_from(path: &Path) -> DashboardConfig {
    if path.exists()
        && let Ok(content) = std::fs::read_to_string(path)
    {
        match serde_json::from_str::<DashboardConfig>(&content) {
            Ok(config) => return config,
            Err(e) => tracing::warn!(path = %path.display(), "Ignoring invalid config: {e}"),
        }
    }
    DashboardConfig::default()
}

pub fn load_config() -> DashboardConfig {
    let mut config = load_config_from(&get_config_path());
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config
}

pub fn save_config_to(config: &DashboardConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn save_config(config: &DashboardConfig) -> Result<()> {
    save_config_to(config, &get_config_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("config.json");

        let config = DashboardConfig {
            default_aggregator: Aggregator::Median,
            preview_row_limit: 25,
            ..DashboardConfig::default()
        };
        save_config_to(&config, &path)?;
        assert_eq!(load_config_from(&path), config);
        Ok(())
    }

    #[test]
    fn test_missing_fields_take_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_aggregator": "count", "demo_seed": 7 }"#)?;

        let config = load_config_from(&path);
        assert_eq!(config.default_aggregator, Aggregator::Count);
        assert_eq!(config.demo_seed, 7);
        assert_eq!(config.demo_records, DEFAULT_RECORDS);
        assert_eq!(config.log_level, "info");
        Ok(())
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json")?;
        assert_eq!(load_config_from(&path), DashboardConfig::default());
        assert_eq!(
            load_config_from(&dir.path().join("absent.json")),
            DashboardConfig::default()
        );
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DashboardConfig::default();
        config.apply_env_overrides(|key| match key {
            ENV_LOG_LEVEL => Some("debug".to_owned()),
            ENV_PREVIEW_ROWS => Some(" 500 ".to_owned()),
            _ => None,
        });
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.preview_row_limit, 500);

        config.apply_env_overrides(|key| (key == ENV_PREVIEW_ROWS).then(|| "lots".to_owned()));
        assert_eq!(config.preview_row_limit, 500);
    }

    #[test]
    fn test_load_options_use_schema_length() {
        let config = DashboardConfig {
            csv_infer_schema_length: 42,
            ..DashboardConfig::default()
        };
        let options = config.load_options();
        assert_eq!(options.infer_schema_length, 42);
        assert!(options.parse_dates);
    }
}
