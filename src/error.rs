//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::EventType;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "validation failed: missing widget_id",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                 |
/// |-----------|------------|-----------------------------|
/// | 1000-1999 | Validation | 400 Bad Request             |
/// | 3000-3999 | Server     | 5xx                         |
///
/// `SourceFetch` and `Configuration` are normally recovered from inside a
/// queue build and only reach a client when raised on their own.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Raw payload is missing the shared envelope.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Request body or parameters are invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Fetching candidates for one event type failed.
    #[error("fetch failed for {event_type}: {message}")]
    SourceFetch {
        /// Event type whose fetch failed.
        event_type: EventType,
        /// Underlying failure.
        message: String,
    },

    /// No rule or template could be resolved.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// The event store could not serve any part of a request.
    #[error("event store unavailable: {0}")]
    StoreUnavailable(String),

    /// A store call exceeded its deadline.
    #[error("operation timed out after {0} ms")]
    Timeout(u64),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::SourceFetch { .. } => 3002,
            Self::Configuration(_) => 3003,
            Self::StoreUnavailable(_) => 3004,
            Self::Timeout(_) => 3005,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::SourceFetch { .. } => StatusCode::BAD_GATEWAY,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Configuration(_) | Self::PersistenceError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
