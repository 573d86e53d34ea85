// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Setup and initialization utilities for endpoints.
//!
//! Endpoints built here pick up their id and token prefixes from the global
//! configuration when it has been initialized.

use crate::config::{endpoint::EndpointConfig, try_get_global_config};
use crate::protocol::jsonrpc::endpoint::{Endpoint, Transport};

/// Endpoint settings from the global configuration, or the defaults.
pub fn endpoint_config() -> EndpointConfig {
    try_get_global_config()
        .map(|global| global.get().endpoint.clone())
        .unwrap_or_default()
}

/// Creates an endpoint configured from the global configuration.
///
/// The built-in methods are registered; application methods are added by the
/// caller.
pub fn create_endpoint(transport: impl Transport + 'static) -> Endpoint {
    Endpoint::with_config(transport, &endpoint_config())
}
