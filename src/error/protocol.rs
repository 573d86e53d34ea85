//! Protocol error module.
//!
//! This module defines errors raised when the engine's API is misused, as
//! opposed to protocol failures that are answered on the wire.

use thiserror::Error;

/// Errors that can occur during protocol operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A request with the same id is still awaiting its response.
    #[error("Duplicate message ID: {0}")]
    DuplicateId(String),

    /// The method name belongs to a built-in method and cannot be replaced.
    #[error("Method is reserved: {0}")]
    ReservedMethod(String),

    /// Outgoing parameters could not be encoded.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
