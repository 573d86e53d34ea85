// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Method dispatcher for JSON-RPC 2.0 messages.
//!
//! The [`Dispatcher`] routes a method name to a registered [`MethodHandler`]
//! and turns every outcome into either a correctly shaped response or, for
//! notifications, silence. Handler failures never escape: carried protocol
//! errors are answered as-is, anything else (panics included) becomes
//! `internal_error`.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::context::CallContext;
use super::error::{HandlerError, JsonRpcError, MethodResult};
use super::typed::{NoParamsHandler, TypedHandler};
use super::types::{make_error, make_result, Id};
use super::validation::validate_request;

/// Trait for method handlers to implement.
pub trait MethodHandler: Send + Sync {
    /// Handle one call.
    ///
    /// # Parameters
    /// * `params` - The call's params, or null when the message had none.
    /// * `context` - Id, progress and cancellation for this call.
    fn handle(&self, params: Value, context: &CallContext) -> MethodResult;
}

impl<F> MethodHandler for F
where
    F: Fn(Value, &CallContext) -> MethodResult + Send + Sync,
{
    fn handle(&self, params: Value, context: &CallContext) -> MethodResult {
        (self)(params, context)
    }
}

/// Shared handle to a registered handler.
pub type MethodHandlerFn = Arc<dyn MethodHandler>;

/// Synchronous method-name-to-handler router.
///
/// Cloning is cheap and clones share the registry. The registry lock is never
/// held while a handler runs, so handlers may register methods themselves.
#[derive(Clone, Default)]
pub struct Dispatcher {
    methods: Arc<RwLock<HashMap<String, MethodHandlerFn>>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a raw handler, replacing any handler already under `method`.
    pub fn add<H>(&self, method: impl Into<String>, handler: H)
    where
        H: MethodHandler + 'static,
    {
        let method = method.into();
        debug!(method = %method, "registering method");
        self.methods.write().insert(method, Arc::new(handler));
    }

    /// Registers a handler taking typed params and returning a typed result.
    ///
    /// Params that fail to convert are answered with `invalid_params`.
    pub fn add_typed<P, R, F>(&self, method: impl Into<String>, handler: F)
    where
        P: DeserializeOwned + 'static,
        R: Serialize + 'static,
        F: Fn(P, &CallContext) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        self.add(method, TypedHandler::new(handler));
    }

    /// Registers a handler that ignores its params.
    pub fn add_no_params<R, F>(&self, method: impl Into<String>, handler: F)
    where
        R: Serialize + 'static,
        F: Fn(&CallContext) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        self.add(method, NoParamsHandler::new(handler));
    }

    /// Unregisters a method. Returns true if it was registered.
    pub fn remove(&self, method: &str) -> bool {
        self.methods.write().remove(method).is_some()
    }

    /// Returns true if `method` has a handler.
    pub fn has_method(&self, method: &str) -> bool {
        self.methods.read().contains_key(method)
    }

    /// Names of all registered methods, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn lookup(&self, method: &str) -> Option<MethodHandlerFn> {
        self.methods.read().get(method).cloned()
    }

    /// Handles one request or notification with a detached call context.
    ///
    /// Returns `None` for notifications.
    pub fn handle_single(&self, msg: &Value) -> Option<Value> {
        self.handle_single_with(msg, |id, _params| CallContext::detached(id.cloned()))
    }

    /// Handles a single message or a batch.
    ///
    /// An empty batch is answered with one `invalid_request` error. A batch whose
    /// elements all stay silent produces `None`, never an empty array.
    pub fn handle(&self, input: &Value) -> Option<Value> {
        match input {
            Value::Array(batch) if batch.is_empty() => {
                warn!("rejecting empty batch");
                Some(make_error(&Id::Null, &JsonRpcError::invalid_request()))
            }
            Value::Array(batch) => {
                let responses: Vec<Value> =
                    batch.iter().filter_map(|msg| self.handle_single(msg)).collect();
                if responses.is_empty() {
                    None
                } else {
                    Some(Value::Array(responses))
                }
            }
            single => self.handle_single(single),
        }
    }

    /// Parses `text` and handles it; unparseable text is answered with `parse_error`.
    pub fn handle_text(&self, text: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(text) {
            Ok(input) => self.handle(&input)?,
            Err(err) => {
                warn!(error = %err, "rejecting unparseable message");
                make_error(&Id::Null, &JsonRpcError::parse_error())
            }
        };
        Some(response.to_string())
    }

    /// Handles one message, building the call context with `make_context`.
    ///
    /// `make_context` receives the request id (`None` for notifications) and the
    /// params the handler is about to see.
    pub fn handle_single_with<C>(&self, msg: &Value, make_context: C) -> Option<Value>
    where
        C: FnOnce(Option<&Id>, &Value) -> CallContext,
    {
        if let Err(why) = validate_request(msg) {
            warn!(reason = %why, "rejecting invalid request");
            return Some(make_error(&Id::Null, &JsonRpcError::invalid_request()));
        }

        // Validated above: `method` is a string and any `id` has an allowed type.
        let method = msg["method"].as_str().unwrap_or_default();
        let id = msg.get("id").and_then(Id::from_value);

        let Some(handler) = self.lookup(method) else {
            debug!(method, "method not found");
            return id.map(|id| make_error(&id, &JsonRpcError::method_not_found()));
        };

        let params = msg.get("params").cloned().unwrap_or(Value::Null);
        let context = make_context(id.as_ref(), &params);
        let outcome = invoke(handler.as_ref(), method, params, &context);

        let Some(id) = id else {
            if let Err(err) = outcome {
                debug!(method, error = %err, "notification handler failed");
            }
            return None;
        };
        Some(match outcome {
            Ok(result) => make_result(&id, result),
            Err(err) => make_error(&id, &err.into_jsonrpc_error()),
        })
    }
}

/// Runs a handler, converting a panic into an internal failure.
fn invoke(
    handler: &dyn MethodHandler,
    method: &str,
    params: Value,
    context: &CallContext,
) -> MethodResult {
    match catch_unwind(AssertUnwindSafe(|| handler.handle(params, context))) {
        Ok(outcome) => outcome,
        Err(panic) => {
            let what = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "handler panicked".to_string()
            };
            error!(method, panic_msg = %what, "method handler panicked");
            crate::error::report_recovered(method, &what);
            Err(HandlerError::Internal(what))
        }
    }
}
