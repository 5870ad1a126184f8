use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use handscribe::{ErrorKind, GenerationError, PipelineError};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: max {0}MB allowed")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Pipeline(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ErrorKind::InvalidProfile | ErrorKind::AnalysisFailure => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorKind::RemoteUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::RemoteError => StatusCode::BAD_GATEWAY,
                ErrorKind::GenerationFailure
                | ErrorKind::StorageFailure
                | ErrorKind::Corrupt
                | ErrorKind::InvalidConfig => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::Timeout => "REQUEST_TIMEOUT",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::NotFound => "NOT_FOUND",
            ServerError::Pipeline(err) => match err.kind() {
                ErrorKind::NotFound => "PROFILE_NOT_FOUND",
                ErrorKind::InvalidRequest => "BAD_REQUEST",
                ErrorKind::InvalidProfile => "INVALID_PROFILE",
                ErrorKind::AnalysisFailure => "ANALYSIS_FAILED",
                ErrorKind::RemoteUnavailable => "GENERATION_UNAVAILABLE",
                ErrorKind::RemoteError => "GENERATION_REMOTE_ERROR",
                ErrorKind::GenerationFailure => "GENERATION_FAILED",
                ErrorKind::StorageFailure => "STORAGE_ERROR",
                ErrorKind::Corrupt => "PROFILE_CORRUPT",
                ErrorKind::InvalidConfig => "CONFIG_ERROR",
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ServerError::Pipeline(err) => match err {
                PipelineError::Store(_) if err.kind() == ErrorKind::NotFound => {
                    "Style profile not found. Please submit handwriting samples first.".to_string()
                }
                PipelineError::Generation(GenerationError::RemoteError { detail, .. }) => {
                    format!("Generation service error: {detail}")
                }
                other => other.to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code = %error_code, error = %self, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
