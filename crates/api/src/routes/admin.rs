use academy_core::model::{LessonId, ModuleId};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::{LessonJson, LessonRequest, ModuleJson, ModuleRequest};
use crate::error::ApiError;
use crate::extract::{Caller, path_id};
use crate::routes::json_body;
use crate::state::AppState;

pub async fn list_modules(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<ModuleJson>>, ApiError> {
    let modules = state
        .services
        .catalog()
        .admin_list_modules(caller.identity)
        .await?;
    Ok(Json(modules.iter().map(ModuleJson::from).collect()))
}

pub async fn create_module(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<ModuleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ModuleJson>), ApiError> {
    let request = json_body(payload)?;
    let module = state
        .services
        .catalog()
        .create_module(caller.identity, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ModuleJson::from(&module))))
}

pub async fn update_module(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<ModuleRequest>, JsonRejection>,
) -> Result<Json<ModuleJson>, ApiError> {
    let module_id: ModuleId = path_id(&id)?;
    let request = json_body(payload)?;
    let module = state
        .services
        .catalog()
        .update_module(caller.identity, module_id, request.into())
        .await?;
    Ok(Json(ModuleJson::from(&module)))
}

pub async fn delete_module(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let module_id: ModuleId = path_id(&id)?;
    state
        .services
        .catalog()
        .delete_module(caller.identity, module_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_lessons(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<Vec<LessonJson>>, ApiError> {
    let module_id: ModuleId = path_id(&id)?;
    let lessons = state
        .services
        .catalog()
        .admin_list_lessons(caller.identity, module_id)
        .await?;
    Ok(Json(lessons.iter().map(LessonJson::from).collect()))
}

pub async fn create_lesson(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<LessonRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LessonJson>), ApiError> {
    let draft = json_body(payload)?.into_draft()?;
    let lesson = state
        .services
        .catalog()
        .create_lesson(caller.identity, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(LessonJson::from(&lesson))))
}

pub async fn update_lesson(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<LessonRequest>, JsonRejection>,
) -> Result<Json<LessonJson>, ApiError> {
    let lesson_id: LessonId = path_id(&id)?;
    let draft = json_body(payload)?.into_draft()?;
    let lesson = state
        .services
        .catalog()
        .update_lesson(caller.identity, lesson_id, draft)
        .await?;
    Ok(Json(LessonJson::from(&lesson)))
}

pub async fn delete_lesson(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let lesson_id: LessonId = path_id(&id)?;
    state
        .services
        .catalog()
        .delete_lesson(caller.identity, lesson_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
