//! Rune Forms configuration system
//!
//! This crate provides centralized configuration for the form engine and its
//! demo driver, loading settings from `rune.toml` with environment variable
//! overrides layered on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator sentinels recognised in section field lists by default.
pub const DEFAULT_SEPARATOR_IDS: [&str; 2] = ["", "separator"];

/// Errors produced while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid TOML for [`RuneConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuneConfig {
    /// Propagation and row-building settings consumed by every form
    pub form: FormConfig,
    /// Demo driver settings
    pub demo: DemoConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Form propagation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormConfig {
    /// Re-run dependency evaluation when an enabled-state change adds or
    /// removes an aggregate entry. When false, dependents only catch up on the
    /// next value edit.
    pub cascade_enabled_changes: bool,
    /// Upper bound on evaluation passes per settle
    pub max_settle_passes: usize,
    /// Section entries rendered as separator rows instead of fields
    pub separator_ids: Vec<String>,
}

/// Demo driver configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Form property bag (JSON) to load instead of the bundled sample
    pub form_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` style filter used when `RUST_LOG` is not set (e.g. "rune_form=debug")
    pub filter: Option<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            cascade_enabled_changes: true,
            max_settle_passes: 16,
            separator_ids: DEFAULT_SEPARATOR_IDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FormConfig {
    /// Whether a section entry names a separator row.
    pub fn is_separator(&self, id: &str) -> bool {
        self.separator_ids.iter().any(|s| s == id)
    }

    /// Pass limit with a floor of one so a settle always evaluates.
    pub fn pass_limit(&self) -> usize {
        self.max_settle_passes.max(1)
    }
}

impl RuneConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("RUNE_CASCADE_ENABLED") {
            self.form.cascade_enabled_changes = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Ok(val) = std::env::var("RUNE_MAX_SETTLE_PASSES") {
            if let Ok(passes) = val.parse::<usize>() {
                self.form.max_settle_passes = passes;
            }
        }

        if let Ok(path) = std::env::var("RUNE_FORM_PATH") {
            self.demo.form_path = Some(PathBuf::from(path));
        }

        if let Ok(filter) = std::env::var("RUNE_LOG") {
            self.logging.filter = Some(filter);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RuneConfig::default();
        assert!(config.form.cascade_enabled_changes);
        assert_eq!(config.form.max_settle_passes, 16);
        assert!(config.form.is_separator(""));
        assert!(config.form.is_separator("separator"));
        assert!(!config.form.is_separator("age"));
        assert!(config.demo.form_path.is_none());
    }

    #[test]
    fn test_toml_serialization() {
        let config = RuneConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RuneConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.form, config.form);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[form]\ncascade_enabled_changes = false").unwrap();

        let config = RuneConfig::load_from_file(file.path()).unwrap();
        assert!(!config.form.cascade_enabled_changes);
        assert_eq!(config.form.max_settle_passes, 16);
        assert_eq!(config.form.separator_ids.len(), 2);
    }

    #[test]
    fn test_invalid_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[form\nbroken").unwrap();

        let err = RuneConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let err = RuneConfig::load_from_file("definitely/not/here/rune.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_pass_limit_floor() {
        let config = FormConfig {
            max_settle_passes: 0,
            ..FormConfig::default()
        };
        assert_eq!(config.pass_limit(), 1);
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("RUNE_CASCADE_ENABLED", "false");
            std::env::set_var("RUNE_MAX_SETTLE_PASSES", "4");
            std::env::set_var("RUNE_FORM_PATH", "forms/custom.json");
        }

        let mut config = RuneConfig::default();
        config.merge_with_env();

        assert!(!config.form.cascade_enabled_changes);
        assert_eq!(config.form.max_settle_passes, 4);
        assert_eq!(
            config.demo.form_path.as_deref(),
            Some(Path::new("forms/custom.json"))
        );

        unsafe {
            std::env::remove_var("RUNE_CASCADE_ENABLED");
            std::env::remove_var("RUNE_MAX_SETTLE_PASSES");
            std::env::remove_var("RUNE_FORM_PATH");
        }
    }
}
