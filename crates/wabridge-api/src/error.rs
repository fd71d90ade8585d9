//! HTTP-facing error taxonomy.
//!
//! Every failure leaves the API as `{"error": {"code", "message"}}` with a
//! stable code:
//!
//! | code  | status | meaning                                   |
//! |-------|--------|-------------------------------------------|
//! | E1001 | 400    | required request fields missing           |
//! | E1002 | 400    | request body is not the expected shape    |
//! | E1003 | 400    | field present but invalid                 |
//! | E2001 | 502    | gateway unreachable                       |
//! | E2002 | 504    | gateway timed out                         |
//! | E2003 | 502    | gateway rejected the call                 |
//! | E2004 | 502    | gateway answered with a non-JSON body     |
//! | E3001 | 500    | database failure                          |
//! | E9999 | 500    | anything else                             |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use wabridge_core::CoreError;
use wabridge_gateway::GatewayError;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required fields are absent or empty (E1001).
    #[error("{0}")]
    MissingFields(String),

    /// Body could not be read as the expected payload (E1002).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A field is present but not acceptable (E1003).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Gateway call failed (E2001-E2004).
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Storage operation failed (E3001).
    #[error(transparent)]
    Storage(CoreError),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(message) => Self::InvalidInput(message),
            other => Self::Storage(other),
        }
    }
}

impl ApiError {
    /// Returns the stable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "E1001",
            Self::MalformedPayload(_) => "E1002",
            Self::InvalidInput(_) => "E1003",
            Self::Gateway(GatewayError::Network { .. }) => "E2001",
            Self::Gateway(GatewayError::Timeout { .. }) => "E2002",
            Self::Gateway(GatewayError::Rejected { .. }) => "E2003",
            Self::Gateway(GatewayError::InvalidResponse { .. }) => "E2004",
            Self::Storage(_) => "E3001",
            Self::Gateway(GatewayError::Configuration { .. }) => "E9999",
        }
    }

    /// Returns the HTTP status this error is reported with.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::MalformedPayload(_) | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            },
            Self::Gateway(GatewayError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Gateway(GatewayError::Configuration { .. }) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code from the table above
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetail { code: self.code().to_string(), message: self.to_string() },
        };

        (status, Json(body)).into_response()
    }
}
