// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The `$/progress` notification, delivered to the token's subscriber.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::PROGRESS;
use crate::protocol::jsonrpc::context::CallContext;
use crate::protocol::jsonrpc::endpoint::EndpointState;
use crate::protocol::jsonrpc::error::{ErrorCode, HandlerError};
use crate::protocol::jsonrpc::handler::Dispatcher;
use crate::protocol::jsonrpc::types::Id;

/// Params of `$/progress`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressParams {
    /// Subscription token; a string, or an integer id used as a token.
    pub token: Value,

    /// Progress payload handed to the subscriber untouched.
    #[serde(default)]
    pub value: Value,
}

/// Registers `$/progress` on the dispatcher.
pub(crate) fn register_progress_method(dispatcher: &Dispatcher, state: Arc<EndpointState>) {
    dispatcher.add_typed(
        PROGRESS,
        move |params: ProgressParams, _ctx: &CallContext| -> Result<(), HandlerError> {
            let token = Id::from_value(&params.token)
                .filter(|token| !token.is_null())
                .ok_or(ErrorCode::InvalidParams)?
                .to_string();
            match state.progress_handler(&token) {
                Some(callback) => callback(params.value),
                None => debug!(token = %token, "no subscriber for progress token"),
            }
            Ok(())
        },
    );
}
