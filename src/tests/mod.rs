//! Test modules for the Lokahi RPC engine.
//!
//! Crate-wide tests live here: configuration loading, error reporting, and the
//! shared fixtures the engine test suites build on.

pub mod test_utils;

// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{
    id_strategy, jsonrpc_method_strategy, params_strategy, RecordingTransport, TestFixture,
};
