//! Collector configuration.
//!
//! Values are resolved in order: built-in defaults, then an optional TOML
//! file named by `BEACON_COLLECTOR_CONFIG`, then individual environment
//! overrides.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CollectorError, CollectorResult};

/// Port the tracker under test is pointed at.
pub const DEFAULT_PORT: u16 = 8500;

/// Path of an optional TOML config file.
pub const ENV_CONFIG_FILE: &str = "BEACON_COLLECTOR_CONFIG";
/// Bind address override.
pub const ENV_BIND: &str = "BEACON_COLLECTOR_BIND";
/// Log format override (`pretty` or `json`).
pub const ENV_LOG_FORMAT: &str = "BEACON_COLLECTOR_LOG_FORMAT";

/// Output format for the binary's log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(CollectorError::Config(format!(
                "unknown log format '{other}' (expected pretty or json)"
            ))),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Configuration for the mock collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Listening address.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_format: LogFormat::default(),
        }
    }
}

impl CollectorConfig {
    /// Builder: listen on `bind`.
    #[must_use]
    pub const fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Parse a TOML document; missing keys take defaults.
    ///
    /// # Errors
    /// Returns `CollectorError::ConfigParse` if the document is invalid.
    pub fn from_toml_str(raw: &str) -> CollectorResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or a value is invalid.
    pub fn from_env() -> CollectorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> CollectorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = match get(ENV_CONFIG_FILE) {
            Some(path) => {
                let path = PathBuf::from(path);
                let raw = std::fs::read_to_string(&path)
                    .map_err(|source| CollectorError::ConfigFile { path, source })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };

        if let Some(raw) = get(ENV_BIND) {
            config.bind = raw
                .trim()
                .parse()
                .map_err(|err| CollectorError::Config(format!("invalid {ENV_BIND}: {err}")))?;
        }
        if let Some(raw) = get(ENV_LOG_FORMAT) {
            config.log_format = raw.parse()?;
        }

        Ok(config)
    }

    /// Validate settings for a standalone collector.
    ///
    /// # Errors
    /// Returns `CollectorError::Config` if the bind port is 0; the tracker
    /// must be pointed at a known port.
    pub fn validate(&self) -> CollectorResult<()> {
        if self.bind.port() == 0 {
            return Err(CollectorError::Config(
                "bind port must be fixed (got 0)".into(),
            ));
        }
        Ok(())
    }
}
