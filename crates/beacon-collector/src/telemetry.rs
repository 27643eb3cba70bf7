//! Tracing subscriber setup for the collector binary.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LogFormat;

/// Install the global subscriber. `RUST_LOG` controls filtering (default
/// `info`).
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (json, pretty) = match format {
        LogFormat::Json => (Some(fmt::layer().json().with_current_span(false)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(false))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
}
