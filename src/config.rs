//! Persistent settings
//!
//! Read from `~/.config/hidtool/config.toml` (or `--config`). Every key is
//! optional; a missing file means defaults. Command-line flags override.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::OutputFormat;

/// Configuration load/save errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// hidtool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HidtoolConfig {
    /// Log filter when neither RUST_LOG nor --log-level is given
    pub log_level: String,
    /// Listing output format
    pub format: OutputFormat,
    /// Print the parent device line in text output
    pub show_parent: bool,
}

impl Default for HidtoolConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            format: OutputFormat::Text,
            show_parent: true,
        }
    }
}

impl HidtoolConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hidtool")
            .join("config.toml")
    }

    /// Load config from a file, or return defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load config, falling back to defaults when the file is unreadable or
    /// malformed. The load error is handed back so the caller can report it.
    pub fn load_or_default(path: &Path) -> (Self, Option<ConfigError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    /// Save config to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HidtoolConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, HidtoolConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config: HidtoolConfig = toml::from_str("format = \"json\"\n").unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.log_level, "warn");
        assert!(config.show_parent);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = HidtoolConfig {
            log_level: "debug".into(),
            format: OutputFormat::Json,
            show_parent: false,
        };
        config.save(&path).unwrap();
        assert_eq!(HidtoolConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "format = \"xml\"\n").unwrap();
        assert!(matches!(
            HidtoolConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "format = \"xml\"\nshow_parent = false\n").unwrap();

        let (config, err) = HidtoolConfig::load_or_default(&path);
        assert_eq!(config, HidtoolConfig::default());
        assert!(matches!(err, Some(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_or_default_keeps_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "show_parent = false\n").unwrap();

        let (config, err) = HidtoolConfig::load_or_default(&path);
        assert!(err.is_none());
        assert!(!config.show_parent);
    }
}
