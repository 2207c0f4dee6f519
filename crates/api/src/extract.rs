use std::str::FromStr;

use academy_core::model::{Identity, ParseIdError};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated caller, resolved from `Authorization: Bearer <token>`.
///
/// Rejects with 401 before the handler runs when the header is missing or
/// the token does not resolve.
#[derive(Debug, Clone)]
pub struct Caller {
    pub identity: Identity,
    pub token: String,
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let Some(token) = bearer_token(parts) else {
            warn!(path = %parts.uri.path(), "missing bearer token");
            return Err(ApiError::Unauthenticated);
        };
        let identity = state.services.auth().authenticate(&token).await?;
        Ok(Self { identity, token })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

/// Parse a path segment into an id, answering 422 for anything that is not
/// a non-negative integer.
pub fn path_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = ParseIdError>,
{
    raw.parse::<T>()
        .map_err(|err| ApiError::invalid("id", format!("The {} id must be an integer.", err.kind())))
}
