//! Survey Errors
//!
//! One taxonomy for everything the intake service can refuse or fail at,
//! plus its mapping onto HTTP responses.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurveyError {
    /// One or more required fields were missing or blank
    #[error("missing required field(s): {}", .fields.join(", "))]
    Validation { fields: Vec<&'static str> },

    /// Body was not valid JSON or not a JSON object
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// No operation matches the route
    #[error("Not found")]
    NotFound,

    /// Backing store could not be read or written
    #[error("store failure: {0}")]
    Store(String),
}

impl SurveyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable, machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Store(_) => "STORE_FAILURE",
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }
}

// Oversized or unreadable bodies answer with the JSON 400 contract
impl From<BytesRejection> for SurveyError {
    fn from(rejection: BytesRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<&'static str>>,
}

impl From<&SurveyError> for ErrorBody {
    fn from(err: &SurveyError) -> Self {
        match err {
            SurveyError::Validation { fields } => Self {
                error: err.to_string(),
                fields: Some(fields.clone()),
            },
            // Internal details stay in the log
            SurveyError::Store(_) => Self {
                error: "Internal server error".to_string(),
                fields: None,
            },
            _ => Self {
                error: err.to_string(),
                fields: None,
            },
        }
    }
}

impl IntoResponse for SurveyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody::from(&self);

        if status.is_server_error() {
            tracing::error!(error_code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(error_code = self.code(), error = %self, status = %status, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;
