//! Lokahi RPC Library
//!
//! A transport-agnostic JSON-RPC 2.0 engine. It validates and builds messages,
//! dispatches requests to registered handlers, correlates responses with the
//! requests that caused them, and layers cooperative cancellation, progress
//! reporting and an `initialize` handshake on top.
//!
//! # Architecture
//!
//! - Messages are [`serde_json::Value`]s; parsing and framing belong to the
//!   embedding application
//! - Outbound traffic goes through one injected [`Transport`](protocol::jsonrpc::Transport)
//! - Inbound traffic enters through [`Endpoint::receive`](protocol::jsonrpc::Endpoint::receive)
//! - Everything runs synchronously on the calling thread

// Re-export public modules
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for the Lokahi RPC engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization function.
///
/// Loads the default configuration, installs logging as configured, and sets
/// the tracing error reporter.
pub fn init() -> error::LokahiResult<()> {
    config::init_default_config()?;
    let config = config::get_global_config()?;
    logging::init_logging(&config.get().log)?;

    error::set_error_reporter(std::sync::Arc::new(error::TracingErrorReporter));

    Ok(())
}
