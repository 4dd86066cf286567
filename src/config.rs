//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::mapping::Precision;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Time-series store addressing
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_measurement")]
    pub measurement: String,

    /// Precision of epoch timestamps in query results
    #[serde(default)]
    pub precision: Precision,
}

fn default_database() -> String {
    "iot".to_string()
}

fn default_measurement() -> String {
    "sensorData".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            measurement: default_measurement(),
            precision: Precision::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("tsa").join("config.toml")),
            Some(PathBuf::from("/etc/tsa/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Store overrides
        if let Some(database) = var("TSA_DATABASE") {
            self.store.database = database;
        }
        if let Some(measurement) = var("TSA_MEASUREMENT") {
            self.store.measurement = measurement;
        }
        if let Some(precision) = var("TSA_PRECISION") {
            match precision.parse() {
                Ok(p) => self.store.precision = p,
                Err(e) => tracing::warn!("Ignoring TSA_PRECISION: {}", e),
            }
        }

        // Logging overrides
        if let Some(level) = var("TSA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TSA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# TSA Configuration
#
# Environment variables override these settings:
# - TSA_DATABASE
# - TSA_MEASUREMENT
# - TSA_PRECISION
# - TSA_LOG_LEVEL
# - TSA_LOG_FORMAT

[store]
# Database every query is bound to
database = "iot"

# Measurement sensor readings are stored in
measurement = "sensorData"

# Unit of epoch timestamps in results: ns, u, ms or s
precision = "ms"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/tsa/tsa.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.database, "iot");
        assert_eq!(config.store.measurement, "sensorData");
        assert_eq!(config.store.precision, Precision::Milliseconds);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.store.database, "iot");
        assert_eq!(config.store.precision, Precision::Milliseconds);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\ndatabase = \"telemetry\"\nprecision = \"s\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.store.database, "telemetry");
        assert_eq!(config.store.measurement, "sensorData");
        assert_eq!(config.store.precision, Precision::Seconds);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[store\ndatabase =").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TSA_DATABASE", "edge"),
            ("TSA_MEASUREMENT", "readings"),
            ("TSA_PRECISION", "ns"),
            ("TSA_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.database, "edge");
        assert_eq!(config.store.measurement, "readings");
        assert_eq!(config.store.precision, Precision::Nanoseconds);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_bad_precision_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "TSA_PRECISION").then(|| "weeks".to_string()));
        assert_eq!(config.store.precision, Precision::Milliseconds);
    }
}
