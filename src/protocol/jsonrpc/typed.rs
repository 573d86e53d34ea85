// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Typed adapters between application types and [`serde_json::Value`].
//!
//! Single scalar or struct arguments travel wrapped in a one-element array so
//! that `params` stays an array or object on the wire. The helpers here apply
//! that convention in both directions, and [`TypedHandler`] /
//! [`NoParamsHandler`] turn typed closures into uniform [`MethodHandler`]s.

use std::any::TypeId;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::context::CallContext;
use super::error::{HandlerError, JsonRpcError, MethodResult};
use super::handler::MethodHandler;

fn is_raw<T: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<Value>()
}

/// Converts wire params (or a wire result) into `P`.
///
/// `Value` passes through untouched. A one-element array is unwrapped first;
/// if the element does not convert, the whole array is tried before giving up
/// with the element's error.
pub fn deserialize_params<P>(params: Value) -> Result<P, serde_json::Error>
where
    P: DeserializeOwned + 'static,
{
    if is_raw::<P>() {
        return serde_json::from_value(params);
    }
    match params {
        Value::Array(mut items) if items.len() == 1 => {
            let element = items.remove(0);
            match serde_json::from_value(element.clone()) {
                Ok(typed) => Ok(typed),
                Err(err) => serde_json::from_value(Value::Array(vec![element])).map_err(|_| err),
            }
        }
        other => serde_json::from_value(other),
    }
}

/// Converts `params` for sending, wrapping anything that is not an array or
/// object in a one-element array.
pub fn serialize_params<P: Serialize + ?Sized>(params: &P) -> Result<Value, serde_json::Error> {
    let value = serde_json::to_value(params)?;
    if value.is_array() || value.is_object() {
        Ok(value)
    } else {
        Ok(Value::Array(vec![value]))
    }
}

/// Converts a handler result back into a value; `()` becomes null.
pub fn serialize_result<R: Serialize + ?Sized>(result: &R) -> Result<Value, serde_json::Error> {
    serde_json::to_value(result)
}

fn invalid_params(err: serde_json::Error) -> HandlerError {
    JsonRpcError::invalid_params()
        .with_data(json!({ "what": err.to_string() }))
        .into()
}

/// Handler taking typed params `P` and returning a typed result `R`.
pub struct TypedHandler<P, R, F> {
    handler: F,
    _types: PhantomData<fn(P) -> R>,
}

impl<P, R, F> TypedHandler<P, R, F>
where
    P: DeserializeOwned + 'static,
    R: Serialize,
    F: Fn(P, &CallContext) -> Result<R, HandlerError> + Send + Sync,
{
    /// Wraps a typed closure.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _types: PhantomData,
        }
    }
}

impl<P, R, F> MethodHandler for TypedHandler<P, R, F>
where
    P: DeserializeOwned + 'static,
    R: Serialize,
    F: Fn(P, &CallContext) -> Result<R, HandlerError> + Send + Sync,
{
    fn handle(&self, params: Value, context: &CallContext) -> MethodResult {
        let typed = deserialize_params::<P>(params).map_err(invalid_params)?;
        let result = (self.handler)(typed, context)?;
        Ok(serialize_result(&result)?)
    }
}

/// Handler that ignores params and returns a typed result `R`.
pub struct NoParamsHandler<R, F> {
    handler: F,
    _result: PhantomData<fn() -> R>,
}

impl<R, F> NoParamsHandler<R, F>
where
    R: Serialize,
    F: Fn(&CallContext) -> Result<R, HandlerError> + Send + Sync,
{
    /// Wraps a parameterless closure.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _result: PhantomData,
        }
    }
}

impl<R, F> MethodHandler for NoParamsHandler<R, F>
where
    R: Serialize,
    F: Fn(&CallContext) -> Result<R, HandlerError> + Send + Sync,
{
    fn handle(&self, _params: Value, context: &CallContext) -> MethodResult {
        let result = (self.handler)(context)?;
        Ok(serialize_result(&result)?)
    }
}
