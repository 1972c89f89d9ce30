use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures reading or writing a JSON document on disk.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected document shape in {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

/// Errors returned to HTTP callers.
///
/// Caller mistakes carry their message through to the response body.
/// Internal failures only expose a generic message; the cause is logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    // message is what the caller sees, e.g. "Failed to update projects"
    pub fn internal(message: impl Into<String>, source: StoreError) -> Self {
        ApiError::Internal {
            message: message.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { message, source } = &self {
            tracing::error!(error = %source, "{message}");
        }
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_class() {
        assert_eq!(
            ApiError::bad_request("ID is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("Achievement not found").status(),
            StatusCode::NOT_FOUND
        );
        let io = StoreError::Io {
            path: PathBuf::from("data/projects.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let err = ApiError::internal("Failed to fetch projects", io);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_message_hides_cause() {
        let corrupt = StoreError::Corrupt {
            path: PathBuf::from("data/testimonials.json"),
            reason: "expected an array".to_string(),
        };
        let err = ApiError::internal("Failed to fetch testimonials", corrupt);
        assert_eq!(err.to_string(), "Failed to fetch testimonials");
    }
}
