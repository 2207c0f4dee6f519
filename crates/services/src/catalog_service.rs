use std::sync::Arc;

use academy_core::model::{
    Audience, Identity, Lesson, LessonDraft, LessonId, Module, ModuleDraft, ModuleId,
};
use academy_core::progress::LessonNavigation;
use storage::repository::{
    LessonRepository, ModuleRepository, NewLessonRecord, NewModuleRecord, StorageError,
};
use tracing::{debug, info};

use crate::Clock;
use crate::error::CatalogServiceError;

/// A module together with the lessons its audience may see, in display order.
#[derive(Debug, Clone)]
pub struct ModuleWithLessons {
    pub module: Module,
    pub lessons: Vec<Lesson>,
}

/// A single lesson with its neighbours inside the module.
#[derive(Debug, Clone)]
pub struct LessonView {
    pub lesson: Lesson,
    pub navigation: LessonNavigation,
}

/// Catalog reads for learners and catalog edits for administrators.
///
/// Visibility rules: a public audience sees published modules only, and a
/// lesson only while both it and its module are published. Hidden entries are
/// reported as missing.
#[derive(Clone)]
pub struct CatalogService {
    clock: Clock,
    modules: Arc<dyn ModuleRepository>,
    lessons: Arc<dyn LessonRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        clock: Clock,
        modules: Arc<dyn ModuleRepository>,
        lessons: Arc<dyn LessonRepository>,
    ) -> Self {
        Self {
            clock,
            modules,
            lessons,
        }
    }

    /// Modules visible to `audience`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list_modules(&self, audience: Audience) -> Result<Vec<Module>, CatalogServiceError> {
        Ok(self.modules.list_modules(audience).await?)
    }

    /// Fetch a visible module with its visible lessons.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::ModuleNotFound` if the module is missing
    /// or hidden from `audience`.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn get_module(
        &self,
        audience: Audience,
        module_id: ModuleId,
    ) -> Result<ModuleWithLessons, CatalogServiceError> {
        let module = self.visible_module(audience, module_id).await?;
        let lessons = self.lessons.list_lessons(module_id, audience).await?;
        Ok(ModuleWithLessons { module, lessons })
    }

    /// Lessons of a visible module, in display order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::ModuleNotFound` if the module is missing
    /// or hidden from `audience`.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list_lessons(
        &self,
        audience: Audience,
        module_id: ModuleId,
    ) -> Result<Vec<Lesson>, CatalogServiceError> {
        self.visible_module(audience, module_id).await?;
        Ok(self.lessons.list_lessons(module_id, audience).await?)
    }

    /// Fetch one lesson of a module with previous/next navigation.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::ModuleNotFound` if the module is missing
    /// or hidden.
    /// Returns `CatalogServiceError::LessonNotFound` if the lesson is missing,
    /// hidden, or belongs to another module.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn get_lesson(
        &self,
        audience: Audience,
        module_id: ModuleId,
        lesson_id: LessonId,
    ) -> Result<LessonView, CatalogServiceError> {
        self.visible_module(audience, module_id).await?;
        let lessons = self.lessons.list_lessons(module_id, audience).await?;
        let navigation = LessonNavigation::locate(&lessons, lesson_id)
            .ok_or(CatalogServiceError::LessonNotFound)?;
        let lesson = lessons
            .into_iter()
            .find(|lesson| lesson.id() == lesson_id)
            .ok_or(CatalogServiceError::LessonNotFound)?;
        Ok(LessonView { lesson, navigation })
    }

    /// Resolve a lesson by id alone, applying the module-gates-lesson rule.
    ///
    /// Returns `Ok(None)` when the lesson is missing or hidden from `audience`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn find_visible_lesson(
        &self,
        audience: Audience,
        lesson_id: LessonId,
    ) -> Result<Option<Lesson>, CatalogServiceError> {
        let Some(lesson) = self.lessons.get_lesson(lesson_id).await? else {
            return Ok(None);
        };
        if audience.sees_unpublished() {
            return Ok(Some(lesson));
        }
        if !lesson.is_published() {
            return Ok(None);
        }
        let module_published = self
            .modules
            .get_module(lesson.module_id())
            .await?
            .is_some_and(|module| module.is_published());
        Ok(module_published.then_some(lesson))
    }

    async fn visible_module(
        &self,
        audience: Audience,
        module_id: ModuleId,
    ) -> Result<Module, CatalogServiceError> {
        self.modules
            .get_module(module_id)
            .await?
            .filter(|module| audience.sees_unpublished() || module.is_published())
            .ok_or(CatalogServiceError::ModuleNotFound)
    }

    //
    // ─── ADMINISTRATION ────────────────────────────────────────────────────────
    //

    /// Every module including drafts.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin callers.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn admin_list_modules(
        &self,
        identity: Identity,
    ) -> Result<Vec<Module>, CatalogServiceError> {
        require_admin(identity)?;
        Ok(self.modules.list_modules(Audience::Admin).await?)
    }

    /// Every lesson of a module including drafts.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin callers.
    /// Returns `CatalogServiceError::ModuleNotFound` if the module is missing.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn admin_list_lessons(
        &self,
        identity: Identity,
        module_id: ModuleId,
    ) -> Result<Vec<Lesson>, CatalogServiceError> {
        require_admin(identity)?;
        self.list_lessons(Audience::Admin, module_id).await
    }

    /// Validate and persist a new module.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin callers.
    /// Returns `CatalogServiceError::Module` for validation failures.
    /// Returns `CatalogServiceError::SlugTaken` if another module uses the slug.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn create_module(
        &self,
        identity: Identity,
        draft: ModuleDraft,
    ) -> Result<Module, CatalogServiceError> {
        require_admin(identity)?;
        let draft = draft.validate()?;
        let module_id = self
            .modules
            .insert_module(NewModuleRecord {
                draft,
                created_at: self.clock.now(),
            })
            .await
            .map_err(slug_conflict)?;
        info!(module_id = module_id.value(), "module created");
        self.reload_module(module_id).await
    }

    /// Replace the editable fields of a module.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin callers.
    /// Returns `CatalogServiceError::Module` for validation failures.
    /// Returns `CatalogServiceError::ModuleNotFound` if the module is missing.
    /// Returns `CatalogServiceError::SlugTaken` if another module uses the slug.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn update_module(
        &self,
        identity: Identity,
        module_id: ModuleId,
        draft: ModuleDraft,
    ) -> Result<Module, CatalogServiceError> {
        require_admin(identity)?;
        let draft = draft.validate()?;
        self.modules
            .update_module(module_id, &draft, self.clock.now())
            .await
            .map_err(|err| match err {
                StorageError::NotFound => CatalogServiceError::ModuleNotFound,
                other => slug_conflict(other),
            })?;
        debug!(module_id = module_id.value(), "module updated");
        self.reload_module(module_id).await
    }

    /// Delete a module and, by cascade, its lessons and their progress.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin callers.
    /// Returns `CatalogServiceError::ModuleNotFound` if the module is missing.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn delete_module(
        &self,
        identity: Identity,
        module_id: ModuleId,
    ) -> Result<(), CatalogServiceError> {
        require_admin(identity)?;
        if !self.modules.delete_module(module_id).await? {
            return Err(CatalogServiceError::ModuleNotFound);
        }
        info!(module_id = module_id.value(), "module deleted");
        Ok(())
    }

    /// Validate and persist a new lesson under an existing module.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin callers.
    /// Returns `CatalogServiceError::Lesson` for validation failures.
    /// Returns `CatalogServiceError::ModuleNotFound` if the module is missing.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn create_lesson(
        &self,
        identity: Identity,
        draft: LessonDraft,
    ) -> Result<Lesson, CatalogServiceError> {
        require_admin(identity)?;
        let draft = draft.validate()?;
        let lesson_id = self
            .lessons
            .insert_lesson(NewLessonRecord {
                draft,
                created_at: self.clock.now(),
            })
            .await
            .map_err(|err| match err {
                StorageError::NotFound => CatalogServiceError::ModuleNotFound,
                other => other.into(),
            })?;
        info!(lesson_id = lesson_id.value(), "lesson created");
        self.reload_lesson(lesson_id).await
    }

    /// Replace the editable fields of a lesson, possibly moving it to another
    /// module.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin callers.
    /// Returns `CatalogServiceError::Lesson` for validation failures.
    /// Returns `CatalogServiceError::LessonNotFound` if the lesson is missing.
    /// Returns `CatalogServiceError::ModuleNotFound` if the target module is
    /// missing.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn update_lesson(
        &self,
        identity: Identity,
        lesson_id: LessonId,
        draft: LessonDraft,
    ) -> Result<Lesson, CatalogServiceError> {
        require_admin(identity)?;
        let draft = draft.validate()?;
        if self.lessons.get_lesson(lesson_id).await?.is_none() {
            return Err(CatalogServiceError::LessonNotFound);
        }
        self.lessons
            .update_lesson(lesson_id, &draft, self.clock.now())
            .await
            .map_err(|err| match err {
                StorageError::NotFound => CatalogServiceError::ModuleNotFound,
                other => other.into(),
            })?;
        debug!(lesson_id = lesson_id.value(), "lesson updated");
        self.reload_lesson(lesson_id).await
    }

    /// Delete a lesson and, by cascade, its progress records.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin callers.
    /// Returns `CatalogServiceError::LessonNotFound` if the lesson is missing.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn delete_lesson(
        &self,
        identity: Identity,
        lesson_id: LessonId,
    ) -> Result<(), CatalogServiceError> {
        require_admin(identity)?;
        if !self.lessons.delete_lesson(lesson_id).await? {
            return Err(CatalogServiceError::LessonNotFound);
        }
        info!(lesson_id = lesson_id.value(), "lesson deleted");
        Ok(())
    }

    async fn reload_module(&self, module_id: ModuleId) -> Result<Module, CatalogServiceError> {
        self.modules
            .get_module(module_id)
            .await?
            .ok_or(CatalogServiceError::ModuleNotFound)
    }

    async fn reload_lesson(&self, lesson_id: LessonId) -> Result<Lesson, CatalogServiceError> {
        self.lessons
            .get_lesson(lesson_id)
            .await?
            .ok_or(CatalogServiceError::LessonNotFound)
    }
}

fn require_admin(identity: Identity) -> Result<(), CatalogServiceError> {
    if identity.is_admin {
        Ok(())
    } else {
        Err(CatalogServiceError::Forbidden)
    }
}

fn slug_conflict(err: StorageError) -> CatalogServiceError {
    match err {
        StorageError::Conflict => CatalogServiceError::SlugTaken,
        other => other.into(),
    }
}
