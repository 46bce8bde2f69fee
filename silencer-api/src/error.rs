//! Error types for silencer-api
//!
//! Per-file failures are values ([`FileError`]) everywhere except single-file
//! mode, where the one failure becomes the response.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::{ArchiveError, FileError, RejectionReason};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request carried no file parts (400)
    #[error("No files provided")]
    NoFilesProvided,

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body over the configured limit (413)
    #[error("Request too large: {0}")]
    PayloadTooLarge(String),

    /// Failure of the only file in a single-file request
    #[error(transparent)]
    File(#[from] FileError),

    /// Archive could not be built (500)
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// silencer-common error
    #[error(transparent)]
    Common(#[from] silencer_common::Error),
}

impl ApiError {
    /// HTTP status and stable machine code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NoFilesProvided => (StatusCode::BAD_REQUEST, "NO_FILES_PROVIDED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::File(err) => {
                let status = match err {
                    FileError::Rejected(RejectionReason::UnsupportedFormat { .. }) => {
                        StatusCode::BAD_REQUEST
                    }
                    FileError::Rejected(RejectionReason::FileTooLarge { .. }) => {
                        StatusCode::PAYLOAD_TOO_LARGE
                    }
                    FileError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    FileError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
                    FileError::Processing(_) | FileError::Cancelled => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.code())
            }
            ApiError::Archive(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ARCHIVE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Common(silencer_common::Error::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        // Body limit overflows surface through the multipart stream
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(format!("malformed multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        } else {
            tracing::warn!(code, error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
