//! JSON request and response bodies.

use academy_core::model::{
    Lesson, LessonDraft, LessonId, LessonKind, LessonSummary, MAX_ID, Module, ModuleDraft,
    ModuleId, ProgressEntry, ProgressId, RegistrationDraft, User, UserId,
};
use academy_core::progress::{LessonNavigation, ModuleProgress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub struct ModuleJson {
    pub id: ModuleId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons: Option<Vec<LessonJson>>,
}

impl From<&Module> for ModuleJson {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id(),
            title: module.title().to_owned(),
            slug: module.slug().to_owned(),
            description: module.description().to_owned(),
            category: module.category().to_owned(),
            duration: module.duration().map(str::to_owned),
            thumbnail: module.thumbnail().map(str::to_owned),
            is_published: module.is_published(),
            created_at: module.created_at(),
            updated_at: module.updated_at(),
            lessons: None,
        }
    }
}

impl ModuleJson {
    #[must_use]
    pub fn with_lessons(module: &Module, lessons: &[Lesson]) -> Self {
        Self {
            lessons: Some(lessons.iter().map(LessonJson::from).collect()),
            ..Self::from(module)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LessonJson {
    pub id: LessonId,
    pub module_id: ModuleId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: LessonKind,
    pub order: u32,
    pub duration: Option<String>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub content: Option<String>,
    pub is_published: bool,
    pub is_free: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationJson>,
}

impl From<&Lesson> for LessonJson {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id(),
            module_id: lesson.module_id(),
            title: lesson.title().to_owned(),
            slug: lesson.slug().to_owned(),
            description: lesson.description().map(str::to_owned),
            kind: lesson.kind().clone(),
            order: lesson.order(),
            duration: lesson.duration().map(str::to_owned),
            video_url: lesson.video_url().map(str::to_owned),
            pdf_url: lesson.document_url().map(str::to_owned),
            content: lesson.content().map(str::to_owned),
            is_published: lesson.is_published(),
            is_free: lesson.is_free(),
            created_at: lesson.created_at(),
            updated_at: lesson.updated_at(),
            navigation: None,
        }
    }
}

impl LessonJson {
    #[must_use]
    pub fn with_navigation(lesson: &Lesson, navigation: LessonNavigation) -> Self {
        Self {
            navigation: Some(NavigationJson {
                previous_lesson_id: navigation.previous,
                next_lesson_id: navigation.next,
            }),
            ..Self::from(lesson)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NavigationJson {
    pub previous_lesson_id: Option<LessonId>,
    pub next_lesson_id: Option<LessonId>,
}

#[derive(Debug, Serialize)]
pub struct LessonSummaryJson {
    pub id: LessonId,
    pub module_id: ModuleId,
    pub title: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: LessonKind,
    pub order: u32,
}

impl From<&LessonSummary> for LessonSummaryJson {
    fn from(lesson: &LessonSummary) -> Self {
        Self {
            id: lesson.id,
            module_id: lesson.module_id,
            title: lesson.title.clone(),
            slug: lesson.slug.clone(),
            kind: lesson.kind.clone(),
            order: lesson.order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressJson {
    pub id: ProgressId,
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lesson: LessonSummaryJson,
}

impl From<&ProgressEntry> for ProgressJson {
    fn from(entry: &ProgressEntry) -> Self {
        let record = &entry.record;
        Self {
            id: record.id,
            user_id: record.user_id,
            lesson_id: record.lesson_id,
            completed: record.completed,
            completed_at: record.completed_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
            lesson: LessonSummaryJson::from(&entry.lesson),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleProgressJson {
    pub module_id: ModuleId,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub percentage: u8,
}

impl From<ModuleProgress> for ModuleProgressJson {
    fn from(progress: ModuleProgress) -> Self {
        Self {
            module_id: progress.module_id,
            completed_lessons: progress.completed_lessons,
            total_lessons: progress.total_lessons,
            percentage: progress.percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserJson {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserJson {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_owned(),
            email: user.email().as_str().to_owned(),
            is_admin: user.is_admin(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthJson {
    pub user: UserJson,
    pub token: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageJson {
    pub message: &'static str,
}

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl From<RegisterRequest> for RegistrationDraft {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            password_confirmation: req.password_confirmation,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MarkCompleteRequest {
    pub lesson_id: Option<Value>,
}

impl MarkCompleteRequest {
    /// `lesson_id` as a JSON integer or a numeric string.
    ///
    /// # Errors
    ///
    /// Returns a validation error on `lesson_id` for anything else.
    pub fn lesson_id(&self) -> Result<LessonId, ApiError> {
        let parsed = match &self.lesson_id {
            None | Some(Value::Null) => {
                return Err(ApiError::invalid(
                    "lesson_id",
                    "The lesson id field is required.",
                ));
            }
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            Some(_) => None,
        };
        parsed
            .filter(|id| *id <= MAX_ID)
            .map(LessonId::new)
            .ok_or_else(|| ApiError::invalid("lesson_id", "The lesson id field must be an integer."))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModuleRequest {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub is_published: bool,
}

impl From<ModuleRequest> for ModuleDraft {
    fn from(req: ModuleRequest) -> Self {
        Self {
            title: req.title,
            slug: req.slug,
            description: req.description,
            category: req.category,
            duration: req.duration,
            thumbnail: req.thumbnail,
            is_published: req.is_published,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LessonRequest {
    pub module_id: Option<u64>,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub order: i64,
    pub duration: Option<String>,
    pub video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub content: Option<String>,
    pub is_published: bool,
    pub is_free: bool,
}

impl Default for LessonRequest {
    fn default() -> Self {
        Self {
            module_id: None,
            title: String::new(),
            slug: String::new(),
            description: None,
            kind: None,
            order: 0,
            duration: None,
            video_url: None,
            pdf_url: None,
            content: None,
            is_published: true,
            is_free: false,
        }
    }
}

impl LessonRequest {
    /// # Errors
    ///
    /// Returns a validation error on `module_id` when it is missing or out
    /// of range.
    pub fn into_draft(self) -> Result<LessonDraft, ApiError> {
        let module_id = match self.module_id {
            None => {
                return Err(ApiError::invalid(
                    "module_id",
                    "The module id field is required.",
                ));
            }
            Some(id) if id > MAX_ID => {
                return Err(ApiError::invalid(
                    "module_id",
                    "The module id field must be an integer.",
                ));
            }
            Some(id) => ModuleId::new(id),
        };
        Ok(LessonDraft {
            module_id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            kind: self.kind.as_deref().map(LessonKind::parse).unwrap_or_default(),
            order: self.order,
            duration: self.duration,
            video_url: self.video_url,
            document_url: self.pdf_url,
            content: self.content,
            is_published: self.is_published,
            is_free: self.is_free,
        })
    }
}
