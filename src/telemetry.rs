//! Logging setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| anyhow!("Invalid log filter '{}': {e}", logging.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if logging.format == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}
