//! Shared API types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::data::LogQueryError;

/// Error body returned by every JSON endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a log query failure, using `fallback` as the message for unexpected errors
    pub fn from_query(e: LogQueryError, fallback: &str) -> Self {
        match e {
            LogQueryError::MissingId => Self::BadRequest(e.to_string()),
            LogQueryError::OutsideRoot(ref id) => {
                tracing::warn!(session = %id, "Rejected session id outside log root");
                Self::Forbidden("Access denied".to_string())
            }
            LogQueryError::NotFound(_) => Self::NotFound("Session not found".to_string()),
            LogQueryError::Io { .. } | LogQueryError::Parse { .. } => {
                tracing::error!(error = %e, "{}", fallback);
                Self::Internal(fallback.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::BadRequest(m) | Self::Forbidden(m) | Self::NotFound(m) | Self::Internal(m) => m,
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
