use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use services::{AuthServiceError, CatalogServiceError, ProgressServiceError};
use thiserror::Error;
use tracing::error;

/// Every failure an HTTP handler can answer with.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<&'static str, Vec<String>>,
    },

    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("This action is unauthorized.")]
    Forbidden,

    #[error("Server Error")]
    Internal,
}

impl ApiError {
    /// Validation failure attached to a single input field.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = BTreeMap::new();
        errors.insert(field, vec![message.clone()]);
        ApiError::Validation { message, errors }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a BTreeMap<&'static str, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match &self {
            ApiError::Validation { errors, .. } => Some(errors),
            _ => None,
        };
        let body = ErrorBody {
            message: self.to_string(),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

fn internal(err: &dyn std::error::Error) -> ApiError {
    error!(error = %err, "request failed");
    ApiError::Internal
}

impl From<CatalogServiceError> for ApiError {
    fn from(err: CatalogServiceError) -> Self {
        match err {
            CatalogServiceError::ModuleNotFound => ApiError::NotFound("Module not found"),
            CatalogServiceError::LessonNotFound => ApiError::NotFound("Lesson not found"),
            CatalogServiceError::Forbidden => ApiError::Forbidden,
            CatalogServiceError::SlugTaken => {
                ApiError::invalid("slug", "The slug has already been taken.")
            }
            CatalogServiceError::Module(e) => ApiError::invalid(e.field(), e.to_string()),
            CatalogServiceError::Lesson(e) => ApiError::invalid(e.field(), e.to_string()),
            other => internal(&other),
        }
    }
}

impl From<ProgressServiceError> for ApiError {
    fn from(err: ProgressServiceError) -> Self {
        match err {
            ProgressServiceError::LessonNotFound => ApiError::NotFound("Lesson not found"),
            ProgressServiceError::ModuleNotFound => ApiError::NotFound("Module not found"),
            ProgressServiceError::ProgressNotFound => ApiError::NotFound("Progress not found"),
            ProgressServiceError::RecordFailed => ApiError::invalid(
                "lesson_id",
                ProgressServiceError::RecordFailed.to_string(),
            ),
            other => internal(&other),
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Unauthenticated => ApiError::Unauthenticated,
            AuthServiceError::Storage(e) => internal(&e),
            other => match other.field() {
                Some(field) => ApiError::invalid(field, other.to_string()),
                None => internal(&other),
            },
        }
    }
}
