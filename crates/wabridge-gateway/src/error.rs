//! Error types for gateway calls.
//!
//! Calls are made once; these errors describe why a single attempt failed.
//! Nothing here is retried.

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Failure modes of a call to the messaging gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Network-level connectivity failure.
    #[error("gateway connection failed: {message}")]
    Network {
        /// Error message describing the network failure
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("gateway request timed out after {timeout_seconds}s")]
    Timeout {
        /// Configured timeout in seconds
        timeout_seconds: u64,
    },

    /// The gateway answered with a non-success status and no JSON body.
    #[error("gateway rejected request: HTTP {status_code}")]
    Rejected {
        /// HTTP status code
        status_code: u16,
        /// Response body content
        body: String,
    },

    /// The gateway answered with a body that is not JSON.
    #[error("gateway returned an invalid response: {message}")]
    InvalidResponse {
        /// Parse error message
        message: String,
    },

    /// The HTTP client could not be built from the configuration.
    #[error("invalid gateway configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl GatewayError {
    /// Creates a network error from a message.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    /// Creates a rejection error from an HTTP response.
    pub fn rejected(status_code: u16, body: impl Into<String>) -> Self {
        Self::Rejected { status_code, body: body.into() }
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse { message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }
}
