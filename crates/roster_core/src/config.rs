//! Core configuration.
//!
//! # Responsibility
//! - Describe store, paging and logging settings as one serde document.
//! - Validate settings before any component consumes them.
//!
//! # Invariants
//! - `0 < paging.default_limit <= paging.max_limit`.
//! - `log_level`, when set, names a supported level; `log_dir`, when set,
//!   is absolute.
//! - Missing fields fall back to documented defaults.

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_PAGE_LIMIT: i64 = 10;
const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// SQLite store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file; `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Page size policy applied by services before paged reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: MAX_PAGE_LIMIT,
        }
    }
}

impl PagingConfig {
    /// Applies the default for a missing limit and clamps oversized ones.
    ///
    /// Zero or negative limits pass through unchanged so the paged read
    /// rejects them.
    pub fn resolve_limit(&self, limit: Option<i64>) -> i64 {
        match limit {
            None => self.default_limit,
            Some(value) if value > self.max_limit => self.max_limit,
            Some(value) => value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub store: StoreConfig,
    pub paging: PagingConfig,
    /// One of `trace|debug|info|warn|error`; `None` uses the build default.
    pub log_level: Option<String>,
    /// Absolute directory for rotating log files; `None` leaves the choice
    /// to the embedding binary.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let paging = &self.paging;
        if paging.default_limit <= 0 {
            return Err(ConfigError::Invalid(format!(
                "paging.default_limit must be > 0, got {}",
                paging.default_limit
            )));
        }
        if paging.max_limit < paging.default_limit {
            return Err(ConfigError::Invalid(format!(
                "paging.max_limit {} is below default_limit {}",
                paging.max_limit, paging.default_limit
            )));
        }
        self.resolved_log_level()?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Configured log level, or [`LogLevel::build_default`] when unset.
    pub fn resolved_log_level(&self) -> Result<LogLevel, ConfigError> {
        match self.log_level.as_deref() {
            Some(level) => level.parse().map_err(ConfigError::Invalid),
            None => Ok(LogLevel::build_default()),
        }
    }
}
