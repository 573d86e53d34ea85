// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! JSON-RPC 2.0 protocol engine.
//!
//! This module implements the [JSON-RPC 2.0 specification](https://www.jsonrpc.org/specification)
//! over [`serde_json::Value`] messages, independent of any transport.
//!
//! # Features
//!
//! - Message validation, classification and builders
//! - Batch handling with notification silence
//! - Typed handler adapters over serde
//! - Request/response correlation for the client side
//! - Cooperative cancellation and progress reporting
//! - The `initialize` handshake
//!
//! # Example
//!
//! ```
//! use lokahi_rpc_lib::protocol::jsonrpc::{CallContext, Endpoint};
//! use parking_lot::Mutex;
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! let sent = Arc::new(Mutex::new(Vec::new()));
//! let outbox = Arc::clone(&sent);
//! let endpoint = Endpoint::new(move |msg: Value| outbox.lock().push(msg));
//!
//! endpoint
//!     .add_typed("add", |(a, b): (i64, i64), _ctx: &CallContext| Ok(a + b))
//!     .unwrap();
//!
//! endpoint.receive(&json!({"jsonrpc": "2.0", "method": "add", "params": [5, 3], "id": 1}));
//!
//! assert_eq!(sent.lock()[0], json!({"jsonrpc": "2.0", "result": 8, "id": 1}));
//! ```

pub mod context;
pub mod correlation;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod methods;
pub mod setup;
pub mod typed;
pub mod types;
pub mod validation;

// Re-exports
pub use context::{CallContext, CancellationFlag};
pub use correlation::RequestResponseCorrelator;
pub use endpoint::{Endpoint, ProgressCallback, Transport};
pub use error::{ErrorCode, HandlerError, JsonRpcError, MethodResult};
pub use handler::{Dispatcher, MethodHandler};
pub use setup::create_endpoint;
pub use types::{make_error, make_notification, make_request, make_result, Id};
pub use validation::{is_notification, is_request, is_response, validate_request, validate_response};

#[cfg(test)]
mod tests;
