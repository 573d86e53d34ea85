// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! The `$/cancelRequest` notification.
//!
//! Sets the cancellation flag of the named request. The flag is created if the
//! request has not arrived yet, so a cancellation that overtakes its request
//! still takes effect.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::CANCEL_REQUEST;
use crate::protocol::jsonrpc::context::CallContext;
use crate::protocol::jsonrpc::endpoint::EndpointState;
use crate::protocol::jsonrpc::error::{ErrorCode, HandlerError};
use crate::protocol::jsonrpc::handler::Dispatcher;
use crate::protocol::jsonrpc::types::Id;

/// Params of `$/cancelRequest`.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelParams {
    /// Id of the request to cancel.
    pub id: Value,
}

/// Registers `$/cancelRequest` on the dispatcher.
pub(crate) fn register_cancel_method(dispatcher: &Dispatcher, state: Arc<EndpointState>) {
    dispatcher.add_typed(
        CANCEL_REQUEST,
        move |params: CancelParams, _ctx: &CallContext| -> Result<(), HandlerError> {
            let id = Id::from_value(&params.id).ok_or(ErrorCode::InvalidParams)?;
            debug!(id = %id, "cancellation requested");
            state.cancellation_flag(&id).cancel();
            Ok(())
        },
    );
}
