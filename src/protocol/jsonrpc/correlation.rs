// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! JSON-RPC 2.0 request/response correlation.
//!
//! Outstanding client requests are kept in a table keyed by [`Id`] until the
//! first matching response arrives. There is no timeout: a caller wanting one
//! tracks elapsed time itself and calls [`RequestResponseCorrelator::discard`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::JsonRpcError;
use super::types::Id;
use crate::error::protocol::ProtocolError;

/// Callback receiving a successful result.
pub type ResultCallback = Box<dyn FnOnce(Value) + Send>;

/// Callback receiving an error response's error object.
pub type ErrorCallback = Box<dyn FnOnce(JsonRpcError) + Send>;

/// A pending request awaiting its response.
struct PendingRequest {
    method: String,
    on_result: ResultCallback,
    on_error: ErrorCallback,
}

/// Manages correlation between outgoing requests and incoming responses.
pub struct RequestResponseCorrelator {
    /// Map of request IDs to pending callbacks.
    pending_requests: Mutex<HashMap<Id, PendingRequest>>,

    /// Last sequence number handed out by [`next_id`](Self::next_id).
    last_id: AtomicU64,

    /// Prefix of generated request ids.
    id_prefix: String,
}

impl RequestResponseCorrelator {
    /// Creates a correlator generating ids `<id_prefix>1`, `<id_prefix>2`, ...
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            pending_requests: Mutex::new(HashMap::new()),
            last_id: AtomicU64::new(0),
            id_prefix: id_prefix.into(),
        }
    }

    /// Generates a fresh request id.
    pub fn next_id(&self) -> Id {
        let n = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        Id::String(format!("{}{}", self.id_prefix, n))
    }

    /// Records the callbacks for a request about to be sent.
    ///
    /// Fails if a request with the same id is still pending.
    pub fn register(
        &self,
        id: Id,
        method: &str,
        on_result: ResultCallback,
        on_error: ErrorCallback,
    ) -> Result<(), ProtocolError> {
        let mut pending = self.pending_requests.lock();
        if pending.contains_key(&id) {
            return Err(ProtocolError::DuplicateId(id.to_string()));
        }
        pending.insert(
            id,
            PendingRequest {
                method: method.to_string(),
                on_result,
                on_error,
            },
        );
        Ok(())
    }

    /// Records the callbacks under a freshly generated id and returns it.
    ///
    /// Generated ids skip any id the caller already registered by hand.
    pub fn register_new(
        &self,
        method: &str,
        on_result: ResultCallback,
        on_error: ErrorCallback,
    ) -> Id {
        let mut pending = self.pending_requests.lock();
        let id = loop {
            let candidate = self.next_id();
            if !pending.contains_key(&candidate) {
                break candidate;
            }
        };
        pending.insert(
            id.clone(),
            PendingRequest {
                method: method.to_string(),
                on_result,
                on_error,
            },
        );
        id
    }

    /// Delivers a validated response to the callback registered for its id.
    ///
    /// The entry is removed before the callback runs. Returns `false` for
    /// unmatched, late, or duplicate responses, which are otherwise ignored.
    pub fn correlate_response(&self, response: &Value) -> bool {
        let Some(id) = response.get("id").and_then(Id::from_value) else {
            return false;
        };
        let Some(request) = self.pending_requests.lock().remove(&id) else {
            debug!(id = %id, "ignoring unmatched response");
            return false;
        };

        if let Some(result) = response.get("result") {
            (request.on_result)(result.clone());
        } else {
            let error = response
                .get("error")
                .and_then(JsonRpcError::from_value)
                .unwrap_or_else(|| {
                    warn!(id = %id, method = %request.method, "undecodable error object");
                    JsonRpcError::internal_error()
                });
            (request.on_error)(error);
        }
        true
    }

    /// Drops a pending request without invoking either callback.
    pub fn discard(&self, id: &Id) -> bool {
        self.pending_requests.lock().remove(id).is_some()
    }

    /// Returns true if a request with this id awaits a response.
    pub fn is_pending(&self, id: &Id) -> bool {
        self.pending_requests.lock().contains_key(id)
    }

    /// Number of requests awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending_requests.lock().len()
    }
}

impl fmt::Debug for RequestResponseCorrelator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestResponseCorrelator")
            .field("pending", &self.pending_count())
            .field("id_prefix", &self.id_prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::jsonrpc::types::{make_error, make_result};
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, ResultCallback, ErrorCallback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ok_seen = seen.clone();
        let err_seen = seen.clone();
        (
            seen,
            Box::new(move |v: Value| ok_seen.lock().push(format!("ok:{v}"))),
            Box::new(move |e: JsonRpcError| err_seen.lock().push(format!("err:{}", e.code))),
        )
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let correlator = RequestResponseCorrelator::new("req-");
        assert_eq!(correlator.next_id(), Id::from("req-1"));
        assert_eq!(correlator.next_id(), Id::from("req-2"));
    }

    #[test]
    fn test_register_new_skips_taken_ids() {
        let correlator = RequestResponseCorrelator::new("req-");
        let (_, ok, err) = recorder();
        correlator.register(Id::from("req-1"), "manual", ok, err).unwrap();

        let (_, ok, err) = recorder();
        let id = correlator.register_new("generated", ok, err);
        assert_eq!(id, Id::from("req-2"));
        assert_eq!(correlator.pending_count(), 2);
    }

    #[test]
    fn test_correlation_success() {
        let correlator = RequestResponseCorrelator::new("req-");
        let (seen, ok, err) = recorder();
        correlator.register(Id::Number(42), "test", ok, err).unwrap();

        assert!(correlator.correlate_response(&make_result(&Id::Number(42), Value::from(7))));
        assert_eq!(*seen.lock(), vec!["ok:7".to_string()]);
        assert_eq!(correlator.pending_count(), 0);

        // A duplicate response finds nothing.
        assert!(!correlator.correlate_response(&make_result(&Id::Number(42), Value::from(7))));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_correlation_error() {
        let correlator = RequestResponseCorrelator::new("req-");
        let (seen, ok, err) = recorder();
        correlator.register(Id::from("a"), "test", ok, err).unwrap();

        let response = make_error(&Id::from("a"), &JsonRpcError::method_not_found());
        assert!(correlator.correlate_response(&response));
        assert_eq!(*seen.lock(), vec!["err:-32601".to_string()]);
    }

    #[test]
    fn test_ids_of_different_types_do_not_collide() {
        let correlator = RequestResponseCorrelator::new("req-");
        let (seen, ok, err) = recorder();
        correlator.register(Id::from("1"), "test", ok, err).unwrap();

        assert!(!correlator.correlate_response(&make_result(&Id::Number(1), Value::Null)));
        assert!(seen.lock().is_empty());
        assert!(correlator.is_pending(&Id::from("1")));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let correlator = RequestResponseCorrelator::new("req-");
        let (_, ok, err) = recorder();
        correlator.register(Id::Number(1), "test", ok, err).unwrap();
        let (_, ok, err) = recorder();
        assert!(matches!(
            correlator.register(Id::Number(1), "test", ok, err),
            Err(ProtocolError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_discard() {
        let correlator = RequestResponseCorrelator::new("req-");
        let (seen, ok, err) = recorder();
        correlator.register(Id::Number(5), "slow", ok, err).unwrap();

        assert!(correlator.discard(&Id::Number(5)));
        assert!(!correlator.discard(&Id::Number(5)));
        assert!(!correlator.correlate_response(&make_result(&Id::Number(5), Value::Null)));
        assert!(seen.lock().is_empty());
    }
}
