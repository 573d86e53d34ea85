// Copyright (c) 2025 Lokahi RPC Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Per-invocation call context handed to every method handler.
//!
//! A [`CallContext`] lives for one synchronous handler call. It exposes the
//! request id, a progress emitter and a cancellation poll. Cancellation is
//! cooperative: setting the flag never interrupts a handler, the handler has
//! to observe [`CallContext::is_canceled`] and bail out on its own.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use super::error::{ErrorCode, HandlerError};
use super::types::Id;

/// Thread-safe cooperative cancellation signal.
///
/// Clones share the same flag, so it can be set from any thread while a
/// handler polls it on another.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Sink receiving `(token, value)` progress updates from a handler.
pub type ProgressSink = Arc<dyn Fn(&str, Value) + Send + Sync>;

/// Ambient state of one handler invocation.
#[derive(Clone)]
pub struct CallContext {
    id: Option<Id>,
    cancellation: CancellationFlag,
    progress: Option<(String, ProgressSink)>,
}

impl CallContext {
    /// Context with no progress channel and a private, never-shared flag.
    pub fn detached(id: Option<Id>) -> Self {
        Self {
            id,
            cancellation: CancellationFlag::new(),
            progress: None,
        }
    }

    /// Context wired to a shared cancellation flag and a progress sink.
    pub fn new(
        id: Option<Id>,
        cancellation: CancellationFlag,
        progress_token: String,
        progress: ProgressSink,
    ) -> Self {
        Self {
            id,
            cancellation,
            progress: Some((progress_token, progress)),
        }
    }

    /// The request id, or `None` while serving a notification.
    pub fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    /// Returns true while serving a notification.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Polls the cancellation flag for this request.
    pub fn is_canceled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fails with `request_cancelled` if cancellation was requested.
    pub fn check_cancelled(&self) -> Result<(), HandlerError> {
        if self.is_canceled() {
            return Err(ErrorCode::RequestCancelled.into());
        }
        Ok(())
    }

    /// Token under which progress for this call is reported.
    pub fn progress_token(&self) -> Option<&str> {
        self.progress.as_ref().map(|(token, _)| token.as_str())
    }

    /// Emits a progress update; a no-op for detached contexts.
    pub fn report_progress(&self, value: Value) {
        if let Some((token, sink)) = &self.progress {
            sink(token, value);
        }
    }
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("id", &self.id)
            .field("cancelled", &self.is_canceled())
            .field("progress_token", &self.progress_token())
            .finish()
    }
}
