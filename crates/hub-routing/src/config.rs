//! Router configuration file.
//!
//! ```toml
//! [engine]
//! reference_time_zone = "ARIZONA"
//! row_errors = "fail_fast"
//! min_batch_spacing_minutes = 5
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! log_data = false
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hub_model::EngineOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

use crate::logging::{LogConfig, LogFormat};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid log level '{level}'")]
    InvalidLevel { level: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub engine: EngineOptions,
    pub logging: LoggingSection,
}

impl RouterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The `[logging]` table; see [`LogConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
    pub timestamps: bool,
    pub target: bool,
    pub spans: bool,
    pub ansi: bool,
    pub file: Option<PathBuf>,
    pub log_data: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        let defaults = LogConfig::default();
        Self {
            level: defaults.level.as_str().to_lowercase(),
            format: defaults.format,
            timestamps: defaults.with_timestamps,
            target: defaults.with_target,
            spans: defaults.with_spans,
            ansi: defaults.with_ansi,
            file: defaults.log_file,
            log_data: defaults.log_data,
        }
    }
}

impl LoggingSection {
    pub fn to_log_config(&self) -> Result<LogConfig, ConfigError> {
        let level = Level::from_str(&self.level).map_err(|_| ConfigError::InvalidLevel {
            level: self.level.clone(),
        })?;
        Ok(LogConfig {
            level,
            with_timestamps: self.timestamps,
            with_target: self.target,
            with_spans: self.spans,
            with_ansi: self.ansi,
            format: self.format,
            log_file: self.file.clone(),
            log_data: self.log_data,
        })
    }
}
