use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const MIN_POLL_SECS: u64 = 5;
pub const MAX_POLL_SECS: u64 = 10;
const DEFAULT_CONFIG_PATH: &str = ".hireline/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("invalid config file: {message}")]
    Parse { message: String },
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Settings from `.hireline/config.toml` (or `$HIRELINE_CONFIG`), overridden
/// by `HIRELINE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api_url: String,
    pub db_path: String,
    pub poll_secs: u64,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            db_path: ".hireline/cache.db".to_string(),
            poll_secs: MIN_POLL_SECS,
            timeout_secs: 15,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HIRELINE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("HIRELINE_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(path) = lookup("HIRELINE_DB_PATH").filter(|v| !v.trim().is_empty()) {
            self.db_path = path;
        }
        if let Some(raw) = lookup("HIRELINE_POLL_SECS") {
            self.poll_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "HIRELINE_POLL_SECS".to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    /// Poll interval, clamped to 5–10 seconds.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs.clamp(MIN_POLL_SECS, MAX_POLL_SECS))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
