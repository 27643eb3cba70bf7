//! Collector error types.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Collector errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// Listening socket could not be bound.
    #[error("Failed to bind collector on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// HTTP server terminated with an error.
    #[error("Collector server error: {0}")]
    Serve(#[source] std::io::Error),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ConfigFile {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML.
    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Query string could not be decoded.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

/// Result type for collector operations.
pub type CollectorResult<T> = Result<T, CollectorError>;
