//! Protocol module for the Lokahi RPC engine.
//!
//! JSON-RPC 2.0 message handling, dispatch, and session state live in
//! [`jsonrpc`].

pub mod jsonrpc;
