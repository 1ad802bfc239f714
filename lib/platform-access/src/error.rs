//! Error types for the platform-access crate.
//!
//! Provider operations return `cloudgate_core::Result<T, AuthenticationError>`
//! so callers receive a rootcause report they can log with full context.

use std::fmt;

/// Errors from authentication providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// A provider configuration lacks a required parameter.
    MissingParameter {
        config_id: String,
        parameter: String,
    },
    /// A provider configuration parameter has an unusable value.
    InvalidParameter {
        config_id: String,
        parameter: String,
        reason: String,
    },
    /// The provider failed while handling a request.
    ProviderError { provider: String, reason: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameter {
                config_id,
                parameter,
            } => {
                write!(
                    f,
                    "auth configuration '{config_id}' is missing parameter '{parameter}'"
                )
            }
            Self::InvalidParameter {
                config_id,
                parameter,
                reason,
            } => {
                write!(
                    f,
                    "auth configuration '{config_id}' has invalid parameter '{parameter}': {reason}"
                )
            }
            Self::ProviderError { provider, reason } => {
                write!(f, "auth provider '{provider}' error: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}
