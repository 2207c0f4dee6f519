use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Serialize;

use crate::dto::{AuthJson, LoginRequest, MessageJson, RegisterRequest, UserJson};
use crate::error::ApiError;
use crate::extract::Caller;
use crate::routes::json_body;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthJson>), ApiError> {
    let request = json_body(payload)?;
    let issued = state.services.auth().register(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthJson {
            user: UserJson::from(&issued.user),
            token: issued.token,
            message: "User registered successfully",
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthJson>, ApiError> {
    let request = json_body(payload)?;
    let issued = state
        .services
        .auth()
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(AuthJson {
        user: UserJson::from(&issued.user),
        token: issued.token,
        message: "Login successful",
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<MessageJson>, ApiError> {
    state.services.auth().logout(&caller.token).await?;
    Ok(Json(MessageJson {
        message: "Logged out successfully",
    }))
}

#[derive(Debug, Serialize)]
pub struct CurrentUserJson {
    pub user: UserJson,
}

pub async fn current_user(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<CurrentUserJson>, ApiError> {
    let user = state.services.auth().current_user(caller.identity).await?;
    Ok(Json(CurrentUserJson {
        user: UserJson::from(&user),
    }))
}
