// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Message model for the JSON-RPC 2.0 protocol.
//!
//! Messages are plain [`serde_json::Value`] objects. This module defines the
//! correlation [`Id`] and the builders that assemble requests, notifications,
//! and responses in their exact wire shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

use super::error::JsonRpcError;

/// The fixed protocol version literal.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request identifier.
///
/// Null, string, or integer. Integers are canonical: any value that fits in an
/// `i64` is `Number`, so `Unsigned` only holds values above `i64::MAX`.
/// A string id and an integer id with the same text are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Id {
    /// Signed integer identifier
    Number(i64),

    /// Integer identifier beyond the signed range
    Unsigned(u64),

    /// String identifier
    String(String),

    /// Explicit null identifier
    Null,
}

impl Id {
    /// Reads an id from a JSON value, rejecting floats, arrays, objects and booleans.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Id::Null),
            Value::String(s) => Some(Id::String(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Id::Number)
                .or_else(|| n.as_u64().map(Id::Unsigned)),
            _ => None,
        }
    }

    /// Returns the id as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Id::Number(n) => json!(n),
            Id::Unsigned(n) => json!(n),
            Id::String(s) => Value::String(s.clone()),
            Id::Null => Value::Null,
        }
    }

    /// Returns true for the explicit null id.
    pub fn is_null(&self) -> bool {
        matches!(self, Id::Null)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "{}", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Unsigned(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Id::String(id.to_string())
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Id::String(id)
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Id::Number(id)
    }
}

impl From<i32> for Id {
    fn from(id: i32) -> Self {
        Id::Number(id.into())
    }
}

impl From<u64> for Id {
    fn from(id: u64) -> Self {
        i64::try_from(id).map(Id::Number).unwrap_or(Id::Unsigned(id))
    }
}

fn envelope() -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("jsonrpc".to_string(), json!(JSONRPC_VERSION));
    object
}

fn is_empty_params(params: &Value) -> bool {
    match params {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

/// Builds a request.
///
/// `id: None` builds a notification: the `id` member is omitted entirely.
/// `Some(Id::Null)` keeps an explicit `"id": null`. `params` is omitted when
/// absent, null, or an empty array/object.
pub fn make_request(id: Option<Id>, method: &str, params: Option<Value>) -> Value {
    let mut object = envelope();
    object.insert("method".to_string(), json!(method));
    if let Some(params) = params.filter(|p| !is_empty_params(p)) {
        object.insert("params".to_string(), params);
    }
    if let Some(id) = id {
        object.insert("id".to_string(), id.to_value());
    }
    Value::Object(object)
}

/// Builds a notification (a request without an id).
pub fn make_notification(method: &str, params: Option<Value>) -> Value {
    make_request(None, method, params)
}

/// Builds a success response.
pub fn make_result(id: &Id, result: Value) -> Value {
    let mut object = envelope();
    object.insert("id".to_string(), id.to_value());
    object.insert("result".to_string(), result);
    Value::Object(object)
}

/// Builds an error response. The error's `data` is omitted when unset.
pub fn make_error(id: &Id, error: &JsonRpcError) -> Value {
    let mut object = envelope();
    object.insert("id".to_string(), id.to_value());
    object.insert("error".to_string(), error.to_value());
    Value::Object(object)
}
