use std::sync::Arc;

use academy_core::model::{Identity, LessonId, ModuleId, ProgressEntry};
use academy_core::progress::ModuleProgress;
use storage::repository::{ProgressRepository, StorageError};
use tracing::{debug, error};

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::{CatalogServiceError, ProgressServiceError};

/// Per-user lesson completion ledger.
///
/// Every operation acts on `identity.user_id` only; there is no way to pass
/// another user's id.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    catalog: Arc<CatalogService>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        progress: Arc<dyn ProgressRepository>,
        catalog: Arc<CatalogService>,
    ) -> Self {
        Self {
            clock,
            progress,
            catalog,
        }
    }

    /// All of the caller's records, each joined with its lesson.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn list(&self, identity: Identity) -> Result<Vec<ProgressEntry>, ProgressServiceError> {
        Ok(self.progress.list_progress(identity.user_id).await?)
    }

    /// Record `lesson_id` as completed for the caller.
    ///
    /// Repeating the call is harmless: the existing record is returned with
    /// its original completion time.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::LessonNotFound` if the lesson is missing
    /// or not visible to the caller.
    /// Returns `ProgressServiceError::RecordFailed` if storage fails.
    pub async fn mark_complete(
        &self,
        identity: Identity,
        lesson_id: LessonId,
    ) -> Result<ProgressEntry, ProgressServiceError> {
        let visible = self
            .catalog
            .find_visible_lesson(identity.audience(), lesson_id)
            .await
            .map_err(|err| record_failed(identity, lesson_id, &err))?;
        if visible.is_none() {
            return Err(ProgressServiceError::LessonNotFound);
        }

        match self
            .progress
            .mark_complete(identity.user_id, lesson_id, self.clock.now())
            .await
        {
            Ok(entry) => {
                debug!(
                    user_id = identity.user_id.value(),
                    lesson_id = lesson_id.value(),
                    "lesson marked complete"
                );
                Ok(entry)
            }
            Err(StorageError::NotFound) => Err(ProgressServiceError::LessonNotFound),
            Err(err) => Err(record_failed(identity, lesson_id, &err)),
        }
    }

    /// Remove the caller's record for `lesson_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::ProgressNotFound` if there was no record.
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn mark_incomplete(
        &self,
        identity: Identity,
        lesson_id: LessonId,
    ) -> Result<(), ProgressServiceError> {
        if !self
            .progress
            .remove_progress(identity.user_id, lesson_id)
            .await?
        {
            return Err(ProgressServiceError::ProgressNotFound);
        }
        debug!(
            user_id = identity.user_id.value(),
            lesson_id = lesson_id.value(),
            "lesson progress removed"
        );
        Ok(())
    }

    /// Completion figures of one module for the caller, over the lessons the
    /// caller can see.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::ModuleNotFound` if the module is missing
    /// or hidden.
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn module_progress(
        &self,
        identity: Identity,
        module_id: ModuleId,
    ) -> Result<ModuleProgress, ProgressServiceError> {
        let lessons = self
            .catalog
            .list_lessons(identity.audience(), module_id)
            .await
            .map_err(|err| match err {
                CatalogServiceError::Storage(err) => ProgressServiceError::Storage(err),
                _ => ProgressServiceError::ModuleNotFound,
            })?;
        let entries = self.progress.list_progress(identity.user_id).await?;
        Ok(ModuleProgress::compute(module_id, &entries, &lessons))
    }
}

fn record_failed(
    identity: Identity,
    lesson_id: LessonId,
    err: &dyn std::error::Error,
) -> ProgressServiceError {
    error!(
        user_id = identity.user_id.value(),
        lesson_id = lesson_id.value(),
        error = %err,
        "failed to mark lesson as complete"
    );
    ProgressServiceError::RecordFailed
}
