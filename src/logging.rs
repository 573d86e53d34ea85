//! Logging setup.
//!
//! The engine only emits `tracing` events. Embedding applications that do not
//! install their own subscriber can call [`init_logging`].

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::error::{LokahiError, LokahiResult};

/// Builds the event filter. `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global tracing subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> LokahiResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_line_number(config.source_location)
        .with_file(config.source_location)
        .with_thread_names(true);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.pretty().finish())
    };

    installed
        .map_err(|e| LokahiError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}
