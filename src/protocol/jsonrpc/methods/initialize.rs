// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Implementation of the JSON-RPC "initialize" method handler.
//!
//! The initialize method is typically the first method called by a client. The
//! params are application-defined and ignored here; the answer carries the
//! capabilities set with
//! [`Endpoint::set_server_capabilities`](crate::protocol::jsonrpc::Endpoint::set_server_capabilities).

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::INITIALIZE;
use crate::protocol::jsonrpc::context::CallContext;
use crate::protocol::jsonrpc::endpoint::EndpointState;
use crate::protocol::jsonrpc::error::HandlerError;
use crate::protocol::jsonrpc::handler::Dispatcher;

/// Result of the initialize method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeResult {
    /// Server capabilities, an application-defined object.
    pub capabilities: Value,
}

/// Registers the initialize method with the dispatcher.
pub(crate) fn register_initialize_method(dispatcher: &Dispatcher, state: Arc<EndpointState>) {
    dispatcher.add_no_params(
        INITIALIZE,
        move |ctx: &CallContext| -> Result<InitializeResult, HandlerError> {
            state.initialized.store(true, Ordering::Release);
            info!(id = ?ctx.id(), "endpoint initialized");
            Ok(InitializeResult {
                capabilities: state.server_capabilities.read().clone(),
            })
        },
    );
}
