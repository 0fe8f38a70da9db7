use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Machine-readable error codes shared by every gateway response.
///
/// The wire contract uses SCREAMING_SNAKE_CASE codes inside the standard
/// envelope `{"error": {"code", "message", "details"?}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    MissingCredential,
    InvalidKey,
    PlatformNotAllowed,
    UcpDisabled,
    NotFound,
    KeyConflict,
    Conflict,
    ServiceUnavailable,
    InternalError,
}

/// Standard UCP error envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Service-level error taxonomy for the gateway.
///
/// `status_code()` is the single source of truth for HTTP status mapping.
/// Authentication failures are never retried and internal faults never leak
/// implementation details or credential material into a response body.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing API key credential")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidKey,

    #[error("Platform is not allowed for this merchant")]
    PlatformNotAllowed,

    #[error("UCP is not enabled for this merchant")]
    UcpDisabled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API key conflict")]
    KeyConflict,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable")]
    ServiceUnavailable { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredential | Self::InvalidKey => StatusCode::UNAUTHORIZED,
            Self::PlatformNotAllowed | Self::UcpDisabled => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::KeyConflict | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::MissingCredential => ErrorCode::MissingCredential,
            Self::InvalidKey => ErrorCode::InvalidKey,
            Self::PlatformNotAllowed => ErrorCode::PlatformNotAllowed,
            Self::UcpDisabled => ErrorCode::UcpDisabled,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::KeyConflict => ErrorCode::KeyConflict,
            Self::Conflict(_) => ErrorCode::Conflict,
            Self::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message suitable for response bodies. Internal faults return a
    /// generic message; the detailed cause stays in the logs.
    pub fn response_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::ServiceUnavailable { .. } => {
                "UCP gateway is temporarily unavailable".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref cause) = self {
            tracing::error!(cause = %cause, "gateway internal error");
        }

        let status = self.status_code();
        let body = ErrorResponse::new(self.error_code(), self.response_message());
        let mut response = (status, Json(body)).into_response();

        if let Self::ServiceUnavailable { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
