//! Application configuration.
//!
//! Precedence, lowest first: built-in defaults, TOML file, environment
//! (`CSV_ROOT`, `EXPORT_DIR`, `PDF_TITLE`, optionally from a `.env` file),
//! then whatever the caller overrides afterwards (CLI flags).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "stockdesk.toml";

pub const ENV_CSV_ROOT: &str = "CSV_ROOT";
pub const ENV_EXPORT_DIR: &str = "EXPORT_DIR";
pub const ENV_REPORT_TITLE: &str = "PDF_TITLE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Where source files live, where exports go, and the report title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory scanned for `*.csv` sources.
    pub csv_root: PathBuf,
    /// Parent directory for export runs.
    pub export_dir: PathBuf,
    pub report_title: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csv_root: PathBuf::from("."),
            export_dir: PathBuf::from("./exports"),
            report_title: "Stocks Dashboard".to_string(),
        }
    }
}

impl AppConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(root) = get(ENV_CSV_ROOT) {
            self.csv_root = PathBuf::from(root);
        }
        if let Some(dir) = get(ENV_EXPORT_DIR) {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(title) = get(ENV_REPORT_TITLE) {
            self.report_title = title;
        }
        self
    }

    /// Full resolution: `.env`, then TOML (explicit path, or
    /// [`DEFAULT_CONFIG_FILE`] if present), then process environment.
    ///
    /// A missing default file is fine; an explicit path must be readable.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }

        let base = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        let config = base.with_env(|key| std::env::var(key).ok());
        debug!(?config, "resolved configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.csv_root, PathBuf::from("."));
        assert_eq!(config.export_dir, PathBuf::from("./exports"));
        assert_eq!(config.report_title, "Stocks Dashboard");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml("csv_root = \"/srv/prices\"\n").unwrap();
        assert_eq!(config.csv_root, PathBuf::from("/srv/prices"));
        assert_eq!(config.export_dir, PathBuf::from("./exports"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = AppConfig::from_toml("csv_root = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [("CSV_ROOT", "/data"), ("PDF_TITLE", "Quarterly")]
            .into_iter()
            .collect();
        let config = AppConfig::from_toml("csv_root = \"/srv\"\nreport_title = \"Old\"\n")
            .unwrap()
            .with_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.csv_root, PathBuf::from("/data"));
        assert_eq!(config.report_title, "Quarterly");
        assert_eq!(config.export_dir, PathBuf::from("./exports"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = AppConfig::default().with_env(|_| Some("  ".to_string()));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
