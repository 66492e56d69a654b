//! Runtime configuration for embedding the core.
//!
//! # Responsibility
//! - Parse the JSON settings file shared by front-ends.
//! - Validate settings with the same rules the logging bootstrap applies.
//!
//! # Invariants
//! - Every field is optional; a missing file section means the default.
//! - `validate()` never touches the filesystem.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Json(err) => write!(f, "malformed config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Settings consumed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// `trace|debug|info|warn|error`; build-mode default when absent.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; no file logging when absent.
    pub log_dir: Option<PathBuf>,
    /// SQLite database file; in-memory when absent.
    pub db_path: Option<PathBuf>,
}

impl CoreConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Effective log level, normalized.
    pub fn log_level(&self) -> Result<&'static str, ConfigError> {
        match &self.log_level {
            Some(level) => normalize_level(level).map_err(ConfigError::Invalid),
            None => Ok(default_log_level()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_level()?;
        if let Some(dir) = &self.log_dir {
            let dir = dir
                .to_str()
                .ok_or_else(|| ConfigError::Invalid("log_dir must be valid UTF-8".to_string()))?;
            normalize_log_dir(dir).map_err(ConfigError::Invalid)?;
        }
        if let Some(path) = &self.db_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.log_level().unwrap(), default_log_level());
    }

    #[test]
    fn rejects_relative_log_dir_and_unknown_level() {
        let err = CoreConfig::from_json(r#"{"log_dir": "logs"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("absolute")));

        let err = CoreConfig::from_json(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = CoreConfig::from_json(r#"{"db": "x.sqlite3"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
