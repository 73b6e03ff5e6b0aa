//! REST error type and its JSON body

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::services::PostQueryError;

/// Errors surfaced by REST handlers. The display text is the client-facing
/// message, except for `Internal`, whose cause is only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or out-of-range query parameter
    #[error("Invalid query parameters")]
    InvalidQuery,

    /// Missing, malformed or expired access token
    #[error("Unauthorized")]
    Unauthorized,

    /// None of the requested authors exists
    #[error("User not found")]
    UserNotFound,

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<PostQueryError> for ApiError {
    fn from(err: PostQueryError) -> Self {
        match err {
            PostQueryError::UserNotFound => ApiError::UserNotFound,
            PostQueryError::Storage(e) => ApiError::Internal(e),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref cause) = self {
            tracing::error!(error = ?cause, "Request failed");
        }

        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
