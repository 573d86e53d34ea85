//! Test utilities and fixtures for the Lokahi RPC engine.
//!
//! This module provides reusable test components: a transport that records
//! what an endpoint sends, proptest strategies for message parts, and a
//! fixture for configuration files and environment overrides.

use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::protocol::jsonrpc::{Id, Transport};

/// Transport that keeps every message it is asked to send.
///
/// Clones share the same log, so a clone can be handed to an endpoint while
/// the test inspects the original.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Value>>>,
}

impl RecordingTransport {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().clone()
    }

    /// Removes and returns everything sent so far.
    pub fn take(&self) -> Vec<Value> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl Transport for RecordingTransport {
    fn send(&self, message: Value) {
        self.sent.lock().push(message);
    }
}

/// Generate a strategy for random JSON-RPC method names.
pub fn jsonrpc_method_strategy() -> BoxedStrategy<String> {
    r"[a-zA-Z][a-zA-Z0-9_]{0,20}".boxed()
}

/// Generate a strategy for valid request ids.
pub fn id_strategy() -> BoxedStrategy<Id> {
    prop_oneof![
        Just(Id::Null),
        any::<i64>().prop_map(Id::Number),
        "[a-zA-Z0-9_-]{1,10}".prop_map(Id::String),
    ]
    .boxed()
}

/// Generate a strategy for valid params: an array or an object.
pub fn params_strategy() -> BoxedStrategy<Value> {
    prop_oneof![
        proptest::collection::vec(any::<i32>(), 0..5).prop_map(|items| json!(items)),
        proptest::collection::btree_map("[a-z]{1,5}", -100i32..100, 0..5)
            .prop_map(|fields| json!(fields)),
    ]
    .boxed()
}

/// Test fixture for tests that touch files and environment variables.
pub struct TestFixture {
    /// Temporary directory for test files
    pub temp_dir: TempDir,
    /// Environment variables to clean up after the test
    env_vars: Vec<String>,
}

impl TestFixture {
    /// Create a new test fixture.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
            env_vars: Vec::new(),
        })
    }

    /// Set an environment variable, removed again when the fixture drops.
    pub fn set_env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        std::env::set_var(&key, value.into());
        self.env_vars.push(key);
    }

    /// Write a file named `name` into the fixture directory.
    pub fn create_file<C: AsRef<[u8]>>(
        &self,
        name: &str,
        contents: C,
    ) -> std::io::Result<std::path::PathBuf> {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

impl Drop for TestFixture {
    fn drop(&mut self) {
        for key in &self.env_vars {
            std::env::remove_var(key);
        }
    }
}
