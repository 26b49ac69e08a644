//! API error type rendered at the handler boundary.
//!
//! Every failure surfaces as `{"error": "<message>"}` with a mapped status:
//! 400 validation, 401 auth, 404 not-found, 500 everything else. Database
//! details are logged, never echoed to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::component::ComponentError;
use crate::services::prompt::PromptError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("internal error")]
    Internal,
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<ComponentError> for ApiError {
    fn from(err: ComponentError) -> Self {
        match err {
            ComponentError::Invalid(msg) => Self::Validation(msg.to_owned()),
            ComponentError::NotFound(_) => Self::NotFound("component"),
            ComponentError::Database(e) => {
                tracing::error!(error = %e, "component query failed");
                Self::Internal
            }
        }
    }
}

impl From<PromptError> for ApiError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Invalid(msg) => Self::Validation(msg.to_owned()),
            err @ (PromptError::MissingReference(_) | PromptError::KindMismatch(_)) => {
                Self::Validation(err.to_string())
            }
            PromptError::NotFound(_) => Self::NotFound("prompt"),
            PromptError::Database(e) => {
                tracing::error!(error = %e, "prompt query failed");
                Self::Internal
            }
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
