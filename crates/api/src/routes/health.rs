use axum::Json;
use axum::extract::State;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthJson {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    pub database: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthJson> {
    let database = if state.services.database_available().await {
        "connected"
    } else {
        "unavailable"
    };
    Json(HealthJson {
        status: "ok",
        message: "API is working",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        database,
    })
}
