use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notesync_versioning::{ErrorKind, VersioningError};
use serde_json::json;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Document not found (404)
    NotFound(String),

    /// Client already has the stored version (304)
    NotModified(String),

    /// Version conflict (409)
    Conflict(String),

    /// Invalid input (400)
    BadRequest(String),

    /// Missing or wrong shared secret (401)
    Unauthorized(String),

    /// Body at or above the size ceiling (413)
    PayloadTooLarge(String),

    /// Internal server error (500)
    Internal(String),
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotModified(_) => StatusCode::NOT_MODIFIED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            // 304 carries no body
            ApiError::NotModified(_) => return status.into_response(),
            ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg) => msg,
        };

        let body = Json(json!({
            "status": "Failure",
            "message": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<VersioningError> for ApiError {
    fn from(err: VersioningError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => ApiError::NotFound(err.to_string()),
            ErrorKind::NotModified => ApiError::NotModified(err.to_string()),
            ErrorKind::VersionConflict => ApiError::Conflict(err.to_string()),
            ErrorKind::InvalidVersion | ErrorKind::Transport => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
