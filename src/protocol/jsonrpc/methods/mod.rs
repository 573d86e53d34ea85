// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Built-in JSON-RPC methods every endpoint serves.
//!
//! These names are reserved: an [`Endpoint`](super::endpoint::Endpoint)
//! registers them on construction and refuses to replace or remove them.

use std::sync::Arc;

use super::endpoint::EndpointState;
use super::handler::Dispatcher;

pub mod cancel;
pub mod initialize;
pub mod progress;

pub use initialize::InitializeResult;

/// Notification asking the peer to cancel one of its in-flight requests.
pub const CANCEL_REQUEST: &str = "$/cancelRequest";

/// Notification carrying a progress update for a token.
pub const PROGRESS: &str = "$/progress";

/// Handshake request answered with the server capabilities.
pub const INITIALIZE: &str = "initialize";

/// Method names an endpoint keeps for itself.
pub const RESERVED_METHODS: [&str; 3] = [CANCEL_REQUEST, PROGRESS, INITIALIZE];

/// Returns true for a built-in method name.
pub fn is_reserved(method: &str) -> bool {
    RESERVED_METHODS.contains(&method)
}

/// Registers the built-in methods, all sharing the endpoint's state.
pub(crate) fn register_builtin_methods(dispatcher: &Dispatcher, state: &Arc<EndpointState>) {
    cancel::register_cancel_method(dispatcher, Arc::clone(state));
    progress::register_progress_method(dispatcher, Arc::clone(state));
    initialize::register_initialize_method(dispatcher, Arc::clone(state));
}
