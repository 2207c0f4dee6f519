use academy_core::model::{Audience, LessonId, ModuleId};
use axum::Json;
use axum::extract::{Path, State};

use crate::dto::{LessonJson, ModuleJson};
use crate::error::ApiError;
use crate::extract::path_id;
use crate::state::AppState;

// Learner-facing reads always use the public audience, whoever is calling.

pub async fn list_modules(State(state): State<AppState>) -> Result<Json<Vec<ModuleJson>>, ApiError> {
    let modules = state
        .services
        .catalog()
        .list_modules(Audience::Public)
        .await?;
    Ok(Json(modules.iter().map(ModuleJson::from).collect()))
}

pub async fn show_module(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModuleJson>, ApiError> {
    let module_id: ModuleId = path_id(&id)?;
    let view = state
        .services
        .catalog()
        .get_module(Audience::Public, module_id)
        .await?;
    Ok(Json(ModuleJson::with_lessons(&view.module, &view.lessons)))
}

pub async fn list_lessons(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LessonJson>>, ApiError> {
    let module_id: ModuleId = path_id(&id)?;
    let lessons = state
        .services
        .catalog()
        .list_lessons(Audience::Public, module_id)
        .await?;
    Ok(Json(lessons.iter().map(LessonJson::from).collect()))
}

pub async fn show_lesson(
    State(state): State<AppState>,
    Path((id, lesson_id)): Path<(String, String)>,
) -> Result<Json<LessonJson>, ApiError> {
    let module_id: ModuleId = path_id(&id)?;
    let lesson_id: LessonId = path_id(&lesson_id)?;
    let view = state
        .services
        .catalog()
        .get_lesson(Audience::Public, module_id, lesson_id)
        .await?;
    Ok(Json(LessonJson::with_navigation(&view.lesson, view.navigation)))
}
