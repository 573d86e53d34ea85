//! Endpoint configuration module.
//!
//! This module defines the settings an endpoint uses when it generates
//! identifiers of its own: request ids and progress tokens.

use super::ConfigResult;
use super::Validate;
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Prefix of generated request ids (`req-1`, `req-2`, ...)
    pub request_id_prefix: String,

    /// Prefix of generated progress tokens (`tok-1`, `tok-2`, ...)
    pub progress_token_prefix: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            request_id_prefix: "req-".to_string(),
            progress_token_prefix: "tok-".to_string(),
        }
    }
}

impl Validate for EndpointConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.request_id_prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "request_id_prefix cannot be empty".to_string(),
            ));
        }

        if self.progress_token_prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "progress_token_prefix cannot be empty".to_string(),
            ));
        }

        // Request ids double as progress tokens when no explicit token is given.
        if self.request_id_prefix == self.progress_token_prefix {
            return Err(ConfigError::ValidationError(
                "request_id_prefix and progress_token_prefix must differ".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_config_is_valid() {
        assert!(EndpointConfig::default().validate().is_ok());
    }

    #[test]
    fn test_prefixes_must_differ() {
        let config = EndpointConfig {
            request_id_prefix: "x-".to_string(),
            progress_token_prefix: "x-".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
