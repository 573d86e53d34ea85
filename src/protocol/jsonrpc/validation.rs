// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Message validation and classification for the JSON-RPC 2.0 engine.
//!
//! The validators check raw [`Value`]s and stop at the first violation found,
//! reporting it as a [`ValidationError`] whose display text is a short reason.

use serde_json::Value;
use thiserror::Error;

use super::types::JSONRPC_VERSION;

/// First rule a message violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The message is not a JSON object
    #[error("not an object")]
    NotAnObject,

    /// The `jsonrpc` member is missing or not "2.0"
    #[error("jsonrpc != 2.0")]
    UnsupportedVersion,

    /// The `method` member is missing or not a string
    #[error("method missing or not string")]
    InvalidMethod,

    /// A request `id` is not null, a string or an integer
    #[error("invalid id type")]
    InvalidId,

    /// `params` is neither an array nor an object
    #[error("params must be array or object")]
    InvalidParams,

    /// A response `id` is missing or of a forbidden type
    #[error("missing or invalid id")]
    MissingId,

    /// A response carries both or neither of `result` and `error`
    #[error("must have exactly one of result or error")]
    AmbiguousOutcome,

    /// The `error` member lacks an integer `code` or a string `message`
    #[error("invalid error object")]
    InvalidErrorObject,
}

/// Returns true iff `id` is null, a string, or an integer.
pub fn valid_id_type(id: &Value) -> bool {
    id.is_null() || id.is_string() || id.is_i64() || id.is_u64()
}

fn has_version(msg: &Value) -> bool {
    msg.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
}

/// Validates a request or notification.
///
/// Checks, in order: object, version, string `method`, `id` type (if present),
/// `params` shape (if present).
pub fn validate_request(msg: &Value) -> Result<(), ValidationError> {
    let object = msg.as_object().ok_or(ValidationError::NotAnObject)?;
    if !has_version(msg) {
        return Err(ValidationError::UnsupportedVersion);
    }
    if !object.get("method").is_some_and(Value::is_string) {
        return Err(ValidationError::InvalidMethod);
    }
    if object.get("id").is_some_and(|id| !valid_id_type(id)) {
        return Err(ValidationError::InvalidId);
    }
    if object
        .get("params")
        .is_some_and(|params| !(params.is_array() || params.is_object()))
    {
        return Err(ValidationError::InvalidParams);
    }
    Ok(())
}

/// Validates a response.
///
/// Checks, in order: object, version, `id` present and of a valid type, exactly
/// one of `result`/`error`, and a well-formed `error` object when present.
pub fn validate_response(msg: &Value) -> Result<(), ValidationError> {
    let object = msg.as_object().ok_or(ValidationError::NotAnObject)?;
    if !has_version(msg) {
        return Err(ValidationError::UnsupportedVersion);
    }
    if !object.get("id").is_some_and(valid_id_type) {
        return Err(ValidationError::MissingId);
    }
    let has_result = object.contains_key("result");
    let error = object.get("error");
    if has_result == error.is_some() {
        return Err(ValidationError::AmbiguousOutcome);
    }
    if let Some(error) = error {
        let well_formed = error.get("code").is_some_and(|c| c.is_i64() || c.is_u64())
            && error.get("message").is_some_and(Value::is_string);
        if !well_formed {
            return Err(ValidationError::InvalidErrorObject);
        }
    }
    Ok(())
}

/// Returns true for a valid request or notification that carries no response members.
pub fn is_request(msg: &Value) -> bool {
    validate_request(msg).is_ok()
        && msg.get("result").is_none()
        && msg.get("error").is_none()
}

/// Returns true for a valid request without an `id` member.
pub fn is_notification(msg: &Value) -> bool {
    is_request(msg) && msg.get("id").is_none()
}

/// Returns true for a valid response.
pub fn is_response(msg: &Value) -> bool {
    validate_response(msg).is_ok()
}
