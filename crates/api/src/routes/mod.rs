use axum::Json;
use axum::extract::rejection::JsonRejection;

use crate::error::ApiError;

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod progress;

/// Unwrap a JSON body, turning malformed payloads into a 422.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::invalid("body", rejection.body_text()))
}
