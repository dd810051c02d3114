//! Server configuration and fixed training paths.
//!
//! Settings come from an optional TOML file (`heartwise.toml` in the working
//! directory, or the file named by `HEARTWISE_CONFIG`) and are then
//! overridden field by field from `HEARTWISE_*` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "heartwise.toml";
/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "HEARTWISE_CONFIG";

/// Raw dataset read by the training program.
pub const TRAINING_DATA_PATH: &str = "data/raw/heart.csv";
/// Artifact written by the training program and loaded by the server.
pub const MODEL_PATH: &str = "models/model.json";
/// Root directory for tracked training runs.
pub const RUNS_DIR: &str = "runs";
/// Experiment name used for tracked training runs.
pub const EXPERIMENT_NAME: &str = "Heart_Disease_Prediction";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Settings for the HTTP prediction server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Worker count; `None` lets actix pick one per physical core.
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_metrics_endpoint")]
    pub metrics_endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            model_path: default_model_path(),
            log_dir: default_log_dir(),
            metrics_endpoint: default_metrics_endpoint(),
        }
    }
}

impl ServerConfig {
    /// Resolve configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Resolve configuration using `lookup` in place of the process environment.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let (path, explicit) = match lookup(CONFIG_PATH_ENV) {
            Some(path) => (PathBuf::from(path), true),
            None => (PathBuf::from(CONFIG_FILE_NAME), false),
        };
        let mut config = if explicit || path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Parse a TOML file; missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = lookup("HEARTWISE_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("HEARTWISE_PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "HEARTWISE_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(workers) = lookup("HEARTWISE_WORKERS") {
            let parsed = workers
                .parse::<usize>()
                .ok()
                .filter(|&count| count > 0)
                .ok_or_else(|| ConfigError::InvalidEnv {
                    key: "HEARTWISE_WORKERS",
                    value: workers.clone(),
                })?;
            self.workers = Some(parsed);
        }
        if let Some(path) = lookup("HEARTWISE_MODEL_PATH") {
            self.model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("HEARTWISE_LOG_DIR") {
            self.log_dir = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> PathBuf {
    PathBuf::from(MODEL_PATH)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heartwise.toml");
        std::fs::write(&path, "port = 9000\nmodel_path = \"artifacts/m.json\"\n").unwrap();
        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.model_path, PathBuf::from("artifacts/m.json"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.metrics_endpoint, "/metrics");
    }

    #[test]
    fn env_overrides_file_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "host = \"127.0.0.1\"\nport = 9000\n").unwrap();
        let path_str = path.to_string_lossy().to_string();
        let config = ServerConfig::load_with(env(&[
            (CONFIG_PATH_ENV, path_str.as_str()),
            ("HEARTWISE_PORT", "8081"),
            ("HEARTWISE_WORKERS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8081);
        assert_eq!(config.workers, Some(2));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = ServerConfig::load_with(env(&[(CONFIG_PATH_ENV, "/nonexistent/heartwise.toml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let err = ServerConfig::load_with(env(&[
            (CONFIG_PATH_ENV, path_str.as_str()),
            ("HEARTWISE_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "HEARTWISE_PORT", .. }));

        let err = ServerConfig::load_with(env(&[
            (CONFIG_PATH_ENV, path_str.as_str()),
            ("HEARTWISE_WORKERS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "HEARTWISE_WORKERS", .. }));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();
        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(ConfigError::ParseToml { .. })
        ));
    }
}
