// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error codes and error carriers for the JSON-RPC 2.0 engine.
//!
//! This module defines the fixed error catalog from the
//! [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification#error_object),
//! the wire error object, and [`HandlerError`], the two-outcome carrier a method
//! handler uses to abort with a specific protocol error instead of succeeding.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Standard JSON-RPC 2.0 error codes plus the request-cancelled extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Parse error (-32700)
    /// Invalid JSON was received.
    ParseError = -32700,

    /// Invalid Request (-32600)
    /// The JSON sent is not a valid Request object.
    InvalidRequest = -32600,

    /// Method not found (-32601)
    MethodNotFound = -32601,

    /// Invalid params (-32602)
    InvalidParams = -32602,

    /// Internal error (-32603)
    InternalError = -32603,

    /// Request cancelled (-32800)
    /// Non-standard; raised by handlers that honor a cancellation request.
    RequestCancelled = -32800,
}

impl ErrorCode {
    /// Returns the canonical message for the error code.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::RequestCancelled => "Request cancelled",
        }
    }

    /// Maps a raw integer onto the catalog, if it is one of the fixed codes.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -32700 => Some(ErrorCode::ParseError),
            -32600 => Some(ErrorCode::InvalidRequest),
            -32601 => Some(ErrorCode::MethodNotFound),
            -32602 => Some(ErrorCode::InvalidParams),
            -32603 => Some(ErrorCode::InternalError),
            -32800 => Some(ErrorCode::RequestCancelled),
            _ => None,
        }
    }

    /// Returns the integer error code.
    pub fn code(&self) -> i64 {
        *self as i64
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> i64 {
        code.code()
    }
}

/// JSON-RPC error object: `{code, message, data?}`.
///
/// Attached to at most one response, never alongside a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("JSON-RPC error {code}: {message}")]
pub struct JsonRpcError {
    /// The error code
    pub code: i64,

    /// A short description of the error
    pub message: String,

    /// Additional information about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Creates an error from a catalog code with a custom message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::custom(code.code(), message)
    }

    /// Creates an error with an application-defined code.
    pub fn custom(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Returns a copy of this error carrying `data`.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Creates the standard parse error.
    pub fn parse_error() -> Self {
        ErrorCode::ParseError.into()
    }

    /// Creates the standard invalid request error.
    pub fn invalid_request() -> Self {
        ErrorCode::InvalidRequest.into()
    }

    /// Creates the standard method not found error.
    pub fn method_not_found() -> Self {
        ErrorCode::MethodNotFound.into()
    }

    /// Creates the standard invalid params error.
    pub fn invalid_params() -> Self {
        ErrorCode::InvalidParams.into()
    }

    /// Creates the standard internal error.
    pub fn internal_error() -> Self {
        ErrorCode::InternalError.into()
    }

    /// Creates the request cancelled error.
    pub fn request_cancelled() -> Self {
        ErrorCode::RequestCancelled.into()
    }

    /// Returns the catalog entry for this error's code, if any.
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }

    /// Decodes an error object received on the wire.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Encodes the error object, omitting `data` when unset or null.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("code".to_string(), json!(self.code));
        object.insert("message".to_string(), json!(self.message));
        if let Some(data) = self.data.as_ref().filter(|d| !d.is_null()) {
            object.insert("data".to_string(), data.clone());
        }
        Value::Object(object)
    }
}

impl From<ErrorCode> for JsonRpcError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code, code.description())
    }
}

/// Failure outcome of a method handler.
///
/// `Rpc` is the sanctioned way to answer with a specific protocol error.
/// Every other failure is `Internal` and is answered with `internal_error`,
/// the original description preserved under `data.what`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Application-chosen protocol error
    #[error(transparent)]
    Rpc(#[from] JsonRpcError),

    /// Any other failure
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    /// Wraps an arbitrary failure description.
    pub fn internal(what: impl std::fmt::Display) -> Self {
        HandlerError::Internal(what.to_string())
    }

    /// Converts the failure into the error object sent on the wire.
    pub fn into_jsonrpc_error(self) -> JsonRpcError {
        match self {
            HandlerError::Rpc(error) => error,
            HandlerError::Internal(what) => {
                JsonRpcError::internal_error().with_data(json!({ "what": what }))
            }
        }
    }
}

impl From<ErrorCode> for HandlerError {
    fn from(code: ErrorCode) -> Self {
        HandlerError::Rpc(code.into())
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(error: anyhow::Error) -> Self {
        HandlerError::Internal(format!("{error:#}"))
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        HandlerError::internal(error)
    }
}

/// Result produced by a raw method handler.
pub type MethodResult = std::result::Result<Value, HandlerError>;
