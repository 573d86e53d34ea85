// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bidirectional JSON-RPC 2.0 endpoint.
//!
//! An [`Endpoint`] wraps a [`Dispatcher`] and a [`Transport`] and adds the
//! session state a peer needs: outstanding client requests, cancellation flags
//! for the requests it is serving, progress subscriptions, and the
//! `initialize` handshake. All inbound traffic enters through
//! [`Endpoint::receive`]; all outbound traffic leaves through the transport.
//!
//! Every call runs synchronously on the calling thread. Tables are guarded so
//! that an endpoint can be shared between threads, but no lock is held while a
//! handler, callback, or the transport runs.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::context::{CallContext, CancellationFlag, ProgressSink};
use super::correlation::{ErrorCallback, RequestResponseCorrelator, ResultCallback};
use super::error::{HandlerError, JsonRpcError};
use super::handler::{Dispatcher, MethodHandler};
use super::methods::{self, is_reserved};
use super::typed::{deserialize_params, serialize_params};
use super::types::{make_error, make_notification, make_request, Id};
use super::validation::validate_response;
use crate::config::endpoint::EndpointConfig;
use crate::error::protocol::ProtocolError;
use crate::error::LokahiResult;

/// Outbound side of an endpoint.
///
/// Any `Fn(Value)` closure is a transport.
pub trait Transport: Send + Sync {
    /// Sends one message (or batch) to the peer.
    fn send(&self, message: Value);
}

impl<F> Transport for F
where
    F: Fn(Value) + Send + Sync,
{
    fn send(&self, message: Value) {
        (self)(message)
    }
}

/// Callback subscribed to a progress token.
pub type ProgressCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// State shared between an endpoint and its built-in methods.
pub(crate) struct EndpointState {
    transport: Box<dyn Transport>,
    pub(crate) cancellations: DashMap<Id, CancellationFlag>,
    pub(crate) progress_handlers: DashMap<String, ProgressCallback>,
    pub(crate) server_capabilities: RwLock<Value>,
    pub(crate) initialized: AtomicBool,
}

impl EndpointState {
    fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            cancellations: DashMap::new(),
            progress_handlers: DashMap::new(),
            server_capabilities: RwLock::new(json!({})),
            initialized: AtomicBool::new(false),
        }
    }

    pub(crate) fn send(&self, message: Value) {
        self.transport.send(message);
    }

    pub(crate) fn send_progress(&self, token: &str, value: Value) {
        self.send(make_notification(
            methods::PROGRESS,
            Some(json!({ "token": token, "value": value })),
        ));
    }

    /// Returns the flag for `id`, creating it if this is the first mention.
    pub(crate) fn cancellation_flag(&self, id: &Id) -> CancellationFlag {
        self.cancellations.entry(id.clone()).or_default().clone()
    }

    /// Looks up the subscriber for `token` without holding the map entry.
    pub(crate) fn progress_handler(&self, token: &str) -> Option<ProgressCallback> {
        self.progress_handlers.get(token).map(|cb| cb.value().clone())
    }
}

/// Stateful JSON-RPC 2.0 session over an injected transport.
pub struct Endpoint {
    dispatcher: Dispatcher,
    state: Arc<EndpointState>,
    correlator: RequestResponseCorrelator,
    progress_tokens: AtomicU64,
    progress_token_prefix: String,
}

impl Endpoint {
    /// Creates an endpoint with default id and token prefixes.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_config(transport, &EndpointConfig::default())
    }

    /// Creates an endpoint using the prefixes from `config`.
    pub fn with_config(transport: impl Transport + 'static, config: &EndpointConfig) -> Self {
        let state = Arc::new(EndpointState::new(Box::new(transport)));
        let dispatcher = Dispatcher::new();
        methods::register_builtin_methods(&dispatcher, &state);

        Self {
            dispatcher,
            state,
            correlator: RequestResponseCorrelator::new(config.request_id_prefix.clone()),
            progress_tokens: AtomicU64::new(0),
            progress_token_prefix: config.progress_token_prefix.clone(),
        }
    }

    fn check_name(method: &str) -> Result<(), ProtocolError> {
        if is_reserved(method) {
            return Err(ProtocolError::ReservedMethod(method.to_string()));
        }
        Ok(())
    }

    /// Registers a raw server-side handler.
    ///
    /// Fails for the built-in method names.
    pub fn add<H>(&self, method: &str, handler: H) -> LokahiResult<()>
    where
        H: MethodHandler + 'static,
    {
        Self::check_name(method)?;
        self.dispatcher.add(method, handler);
        Ok(())
    }

    /// Registers a typed server-side handler.
    pub fn add_typed<P, R, F>(&self, method: &str, handler: F) -> LokahiResult<()>
    where
        P: DeserializeOwned + 'static,
        R: Serialize + 'static,
        F: Fn(P, &CallContext) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        Self::check_name(method)?;
        self.dispatcher.add_typed(method, handler);
        Ok(())
    }

    /// Registers a server-side handler that ignores its params.
    pub fn add_no_params<R, F>(&self, method: &str, handler: F) -> LokahiResult<()>
    where
        R: Serialize + 'static,
        F: Fn(&CallContext) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        Self::check_name(method)?;
        self.dispatcher.add_no_params(method, handler);
        Ok(())
    }

    /// Unregisters an application method. Built-in methods stay.
    pub fn remove(&self, method: &str) -> bool {
        !is_reserved(method) && self.dispatcher.remove(method)
    }

    /// Returns true if `method` has a handler, built-ins included.
    pub fn has_method(&self, method: &str) -> bool {
        self.dispatcher.has_method(method)
    }

    /// Names of all registered methods, sorted.
    pub fn methods(&self) -> Vec<String> {
        self.dispatcher.methods()
    }

    /// Sends a request under a generated id and returns that id.
    ///
    /// Exactly one of the callbacks runs, from inside the [`receive`](Self::receive)
    /// call that delivers the matching response.
    pub fn send_request<R, E>(&self, method: &str, params: Value, on_result: R, on_error: E) -> Id
    where
        R: FnOnce(Value) + Send + 'static,
        E: FnOnce(JsonRpcError) + Send + 'static,
    {
        let id = self
            .correlator
            .register_new(method, Box::new(on_result), Box::new(on_error));
        debug!(id = %id, method, "sending request");
        self.state
            .send(make_request(Some(id.clone()), method, Some(params)));
        id
    }

    /// Sends a request under a caller-chosen id.
    ///
    /// Fails without sending if a request with this id is still pending.
    pub fn send_request_with_id<R, E>(
        &self,
        id: Id,
        method: &str,
        params: Value,
        on_result: R,
        on_error: E,
    ) -> LokahiResult<()>
    where
        R: FnOnce(Value) + Send + 'static,
        E: FnOnce(JsonRpcError) + Send + 'static,
    {
        self.correlator
            .register(id.clone(), method, Box::new(on_result), Box::new(on_error))?;
        debug!(id = %id, method, "sending request");
        self.state.send(make_request(Some(id), method, Some(params)));
        Ok(())
    }

    /// Sends a request with typed params and a typed result callback.
    ///
    /// A result that does not convert to `R` is delivered to `on_error` as
    /// `internal_error` with the conversion failure in `data.what`.
    pub fn send_request_typed<P, R, OnResult, OnError>(
        &self,
        method: &str,
        params: &P,
        on_result: OnResult,
        on_error: OnError,
    ) -> LokahiResult<Id>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned + 'static,
        OnResult: FnOnce(R) + Send + 'static,
        OnError: FnOnce(JsonRpcError) + Send + 'static,
    {
        let params = encode_params(params)?;
        let (typed_result, typed_error) = typed_callbacks::<R, _, _>(method, on_result, on_error);
        Ok(self.send_request(method, params, typed_result, typed_error))
    }

    /// Sends a notification.
    pub fn send_notification(&self, method: &str, params: Value) {
        self.state.send(make_notification(method, Some(params)));
    }

    /// Sends a notification with typed params.
    pub fn send_notification_typed<P>(&self, method: &str, params: &P) -> LokahiResult<()>
    where
        P: Serialize + ?Sized,
    {
        self.send_notification(method, encode_params(params)?);
        Ok(())
    }

    /// Sends the `initialize` request to the peer.
    pub fn initialize<R, E>(&self, params: Value, on_result: R, on_error: E) -> Id
    where
        R: FnOnce(Value) + Send + 'static,
        E: FnOnce(JsonRpcError) + Send + 'static,
    {
        self.send_request(methods::INITIALIZE, params, on_result, on_error)
    }

    /// Asks the peer to cancel a request this endpoint sent.
    ///
    /// The request stays pending; a peer honoring the cancellation still
    /// answers, usually with `request_cancelled`.
    pub fn cancel(&self, id: &Id) {
        debug!(id = %id, "requesting cancellation");
        self.send_notification(methods::CANCEL_REQUEST, json!({ "id": id.to_value() }));
    }

    /// Forgets a pending request without running its callbacks.
    pub fn discard_pending(&self, id: &Id) -> bool {
        self.correlator.discard(id)
    }

    /// Number of requests awaiting a response.
    pub fn pending_requests(&self) -> usize {
        self.correlator.pending_count()
    }

    /// Returns a fresh progress token.
    pub fn create_progress_token(&self) -> String {
        let n = self.progress_tokens.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.progress_token_prefix, n)
    }

    /// Subscribes `callback` to `$/progress` notifications carrying `token`.
    ///
    /// Replaces any earlier subscriber. Subscriptions stay until
    /// [`off_progress`](Self::off_progress).
    pub fn on_progress<F>(&self, token: impl Into<String>, callback: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.state
            .progress_handlers
            .insert(token.into(), Arc::new(callback));
    }

    /// Removes the subscriber for `token`. Returns true if there was one.
    pub fn off_progress(&self, token: &str) -> bool {
        self.state.progress_handlers.remove(token).is_some()
    }

    /// Sends a `$/progress` notification.
    pub fn send_progress(&self, token: &str, value: Value) {
        self.state.send_progress(token, value);
    }

    /// Sets the capabilities returned by the `initialize` method.
    pub fn set_server_capabilities(&self, capabilities: Value) {
        *self.state.server_capabilities.write() = capabilities;
    }

    /// Capabilities returned by the `initialize` method.
    pub fn server_capabilities(&self) -> Value {
        self.state.server_capabilities.read().clone()
    }

    /// Returns true once the peer has called `initialize`.
    pub fn is_initialized(&self) -> bool {
        self.state.initialized.load(Ordering::Acquire)
    }

    /// Single ingress point for messages from the peer.
    ///
    /// Requests and notifications are dispatched; responses are matched
    /// against pending requests. Whatever answer results is sent through the
    /// transport, a batch answered as one array.
    pub fn receive(&self, message: &Value) {
        match message {
            Value::Array(batch) if batch.is_empty() => {
                warn!("rejecting empty batch");
                self.state
                    .send(make_error(&Id::Null, &JsonRpcError::invalid_request()));
            }
            Value::Array(batch) => {
                let responses: Vec<Value> =
                    batch.iter().filter_map(|msg| self.receive_one(msg)).collect();
                if !responses.is_empty() {
                    self.state.send(Value::Array(responses));
                }
            }
            single => {
                if let Some(response) = self.receive_one(single) {
                    self.state.send(response);
                }
            }
        }
    }

    /// Parses `text` and receives it; unparseable text is answered with `parse_error`.
    pub fn receive_text(&self, text: &str) {
        match serde_json::from_str::<Value>(text) {
            Ok(message) => self.receive(&message),
            Err(err) => {
                warn!(error = %err, "rejecting unparseable message");
                self.state
                    .send(make_error(&Id::Null, &JsonRpcError::parse_error()));
            }
        }
    }

    fn receive_one(&self, msg: &Value) -> Option<Value> {
        if looks_like_response(msg) {
            match validate_response(msg) {
                Ok(()) => {
                    self.correlator.correlate_response(msg);
                    return None;
                }
                // Falls through to the dispatcher, which answers `invalid_request`.
                Err(why) => warn!(reason = %why, "rejecting malformed response"),
            }
        }

        let response = self
            .dispatcher
            .handle_single_with(msg, |id, params| self.call_context(id, params));
        if response.is_some() {
            if let Some(id) = msg.get("id").and_then(Id::from_value) {
                self.state.cancellations.remove(&id);
            }
        }
        response
    }

    fn call_context(&self, id: Option<&Id>, params: &Value) -> CallContext {
        let cancellation = match id {
            Some(id) => self.state.cancellation_flag(id),
            None => CancellationFlag::new(),
        };
        let token = params
            .get("progressToken")
            .and_then(Id::from_value)
            .filter(|token| *token != Id::Null)
            .or_else(|| id.cloned())
            .unwrap_or(Id::Null)
            .to_string();

        let state = Arc::clone(&self.state);
        let sink: ProgressSink =
            Arc::new(move |token: &str, value: Value| state.send_progress(token, value));
        CallContext::new(id.cloned(), cancellation, token, sink)
    }
}

fn encode_params<P: Serialize + ?Sized>(params: &P) -> Result<Value, ProtocolError> {
    serialize_params(params).map_err(|e| ProtocolError::InvalidParams(e.to_string()))
}

/// Adapts typed client callbacks to raw ones sharing a single `on_error`.
fn typed_callbacks<R, OnResult, OnError>(
    method: &str,
    on_result: OnResult,
    on_error: OnError,
) -> (ResultCallback, ErrorCallback)
where
    R: DeserializeOwned + 'static,
    OnResult: FnOnce(R) + Send + 'static,
    OnError: FnOnce(JsonRpcError) + Send + 'static,
{
    let on_error = Arc::new(Mutex::new(Some(on_error)));
    let on_decode_error = Arc::clone(&on_error);
    let method = method.to_string();

    let typed_result = move |value: Value| match deserialize_params::<R>(value) {
        Ok(typed) => on_result(typed),
        Err(err) => {
            let what = err.to_string();
            warn!(method = %method, error = %what, "undecodable result");
            crate::error::report_recovered(&method, &what);
            let callback = on_decode_error.lock().take();
            if let Some(callback) = callback {
                callback(JsonRpcError::internal_error().with_data(json!({ "what": what })));
            }
        }
    };
    let typed_error = move |error: JsonRpcError| {
        let callback = on_error.lock().take();
        if let Some(callback) = callback {
            callback(error);
        }
    };
    (Box::new(typed_result), Box::new(typed_error))
}

/// A message without `method` that carries an outcome is a response.
fn looks_like_response(msg: &Value) -> bool {
    msg.get("method").is_none() && (msg.get("result").is_some() || msg.get("error").is_some())
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("methods", &self.dispatcher.methods())
            .field("pending", &self.correlator.pending_count())
            .field("cancellations", &self.state.cancellations.len())
            .field("progress_handlers", &self.state.progress_handlers.len())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
