//! Dashboard configuration, read from JSON with defaults for missing fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";
/// Environment variable overriding the config path.
pub const CONFIG_ENV: &str = "COSMETICS_DASHBOARD_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid log level: {0}")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV loaded at startup, if any.
    pub data_path: Option<PathBuf>,
    /// Label selected when a dataset is loaded.
    pub preferred_label: String,
    pub resize_debounce_ms: u64,
    /// Minimum width change before the flow diagram is rebuilt.
    pub flow_min_width_delta: f32,
    pub top_brands: usize,
    pub top_ingredients: usize,
    pub export_dir: Option<PathBuf>,
    pub open_after_export: bool,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            preferred_label: "Moisturizer".to_string(),
            resize_debounce_ms: 200,
            flow_min_width_delta: 50.0,
            top_brands: 10,
            top_ingredients: 25,
            export_dir: None,
            open_after_export: false,
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.max_level()?;
        Ok(config)
    }

    /// Parsed `log_level` (`error`, `warn`, `info`, `debug` or `trace`).
    pub fn max_level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Config path from the environment, else `dashboard.json`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load from `path`; a missing file yields defaults, a malformed one is an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            DashboardConfig::from_json(r#"{"preferred_label": "Cleanser", "top_brands": 5}"#)
                .unwrap();
        assert_eq!(config.preferred_label, "Cleanser");
        assert_eq!(config.top_brands, 5);
        assert_eq!(config.top_ingredients, 25);
        assert_eq!(config.resize_debounce_ms, 200);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            DashboardConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_log_level() {
        let config = DashboardConfig::from_json(r#"{"log_level": "DEBUG"}"#).unwrap();
        assert_eq!(config.max_level().unwrap(), Level::DEBUG);
        assert_eq!(DashboardConfig::default().max_level().unwrap(), Level::INFO);
        assert!(matches!(
            DashboardConfig::from_json(r#"{"log_level": "verbose"}"#),
            Err(ConfigError::LogLevel(ref l)) if l == "verbose"
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = Path::new("definitely/not/here/dashboard.json");
        assert_eq!(DashboardConfig::load_or_default(path).unwrap(), DashboardConfig::default());
    }
}
