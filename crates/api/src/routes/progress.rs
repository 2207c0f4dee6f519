use academy_core::model::{LessonId, ModuleId};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::{MarkCompleteRequest, MessageJson, ModuleProgressJson, ProgressJson};
use crate::error::ApiError;
use crate::extract::{Caller, path_id};
use crate::routes::json_body;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<ProgressJson>>, ApiError> {
    let entries = state.services.progress().list(caller.identity).await?;
    Ok(Json(entries.iter().map(ProgressJson::from).collect()))
}

/// Always 201 on success, including when the lesson was already completed.
pub async fn mark_complete(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<MarkCompleteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProgressJson>), ApiError> {
    let lesson_id = json_body(payload)?.lesson_id()?;
    let entry = state
        .services
        .progress()
        .mark_complete(caller.identity, lesson_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ProgressJson::from(&entry))))
}

pub async fn mark_incomplete(
    State(state): State<AppState>,
    caller: Caller,
    Path(lesson_id): Path<String>,
) -> Result<Json<MessageJson>, ApiError> {
    let lesson_id: LessonId = path_id(&lesson_id)?;
    state
        .services
        .progress()
        .mark_incomplete(caller.identity, lesson_id)
        .await?;
    Ok(Json(MessageJson {
        message: "Progress removed successfully",
    }))
}

pub async fn module_progress(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ModuleProgressJson>, ApiError> {
    let module_id: ModuleId = path_id(&id)?;
    let progress = state
        .services
        .progress()
        .module_progress(caller.identity, module_id)
        .await?;
    Ok(Json(progress.into()))
}
