use async_trait::async_trait;
use chrono::{DateTime, Utc};
use academy_core::model::{
    Audience, Email, Lesson, LessonDraft, LessonId, Module, ModuleDraft, ModuleId, ProgressEntry,
    ProgressId, ProgressRecord, User, UserId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Validated module fields ready for insertion.
#[derive(Debug, Clone)]
pub struct NewModuleRecord {
    pub draft: ModuleDraft,
    pub created_at: DateTime<Utc>,
}

/// Validated lesson fields ready for insertion.
#[derive(Debug, Clone)]
pub struct NewLessonRecord {
    pub draft: LessonDraft,
    pub created_at: DateTime<Utc>,
}

/// Account fields ready for insertion. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password digest, for login checks only.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Catalog store: modules.
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Insert a module and return its new id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the slug is taken.
    async fn insert_module(&self, module: NewModuleRecord) -> Result<ModuleId, StorageError>;

    /// Replace the editable fields of a module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, `StorageError::Conflict`
    /// if the new slug is taken.
    async fn update_module(
        &self,
        id: ModuleId,
        draft: &ModuleDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Delete a module with its lessons and their progress records.
    /// Returns `false` if nothing was deleted.
    async fn delete_module(&self, id: ModuleId) -> Result<bool, StorageError>;

    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError>;

    /// Modules visible to `audience`, ordered by id.
    async fn list_modules(&self, audience: Audience) -> Result<Vec<Module>, StorageError>;
}

/// Catalog store: lessons.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Insert a lesson and return its new id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the owning module does not exist.
    async fn insert_lesson(&self, lesson: NewLessonRecord) -> Result<LessonId, StorageError>;

    /// Replace the editable fields of a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson or the target module is missing.
    async fn update_lesson(
        &self,
        id: LessonId,
        draft: &LessonDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Delete a lesson and its progress records. Returns `false` if nothing was deleted.
    async fn delete_lesson(&self, id: LessonId) -> Result<bool, StorageError>;

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError>;

    /// Lessons of `module_id` visible to `audience`, ordered by `(order, id)`.
    ///
    /// Only the lesson's own published flag is applied here; module gating
    /// is the caller's concern.
    async fn list_lessons(
        &self,
        module_id: ModuleId,
        audience: Audience,
    ) -> Result<Vec<Lesson>, StorageError>;
}

/// The progress ledger.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Every record of `user_id`, joined with its lesson.
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressEntry>, StorageError>;

    /// Upsert the `(user_id, lesson_id)` record as completed in one atomic
    /// unit. An already-completed record is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn mark_complete(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        at: DateTime<Utc>,
    ) -> Result<ProgressEntry, StorageError>;

    /// Delete the `(user_id, lesson_id)` record. Returns `false` if there was none.
    async fn remove_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<bool, StorageError>;
}

/// Identity store: accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the email is taken.
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserId, StorageError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, StorageError>;
}

/// Identity store: bearer tokens, keyed by their SHA-256 digest.
#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    async fn insert_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    async fn find_user_by_token(&self, token_hash: &str) -> Result<Option<User>, StorageError>;

    /// Returns `false` if no such token existed.
    async fn revoke_token(&self, token_hash: &str) -> Result<bool, StorageError>;
}

/// Liveness of the backing store.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct Tables {
    modules: BTreeMap<ModuleId, Module>,
    lessons: BTreeMap<LessonId, Lesson>,
    progress: BTreeMap<ProgressId, ProgressRecord>,
    users: BTreeMap<UserId, StoredUser>,
    tokens: HashMap<String, UserId>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn slug_taken(&self, slug: &str, except: Option<ModuleId>) -> bool {
        self.modules
            .values()
            .any(|m| m.slug() == slug && Some(m.id()) != except)
    }

    fn entry(&self, record: &ProgressRecord) -> Result<ProgressEntry, StorageError> {
        let lesson = self
            .lessons
            .get(&record.lesson_id)
            .ok_or_else(|| StorageError::Serialization("dangling progress record".into()))?;
        Ok(ProgressEntry {
            record: record.clone(),
            lesson: lesson.summary(),
        })
    }
}

fn invalid<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// All tables sit behind one mutex, so every trait method is atomic.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ModuleRepository for InMemoryRepository {
    async fn insert_module(&self, module: NewModuleRecord) -> Result<ModuleId, StorageError> {
        let mut guard = self.lock()?;
        if guard.slug_taken(&module.draft.slug, None) {
            return Err(StorageError::Conflict);
        }
        let id = ModuleId::new(guard.next_id());
        let stored = Module::from_persisted(id, module.draft, module.created_at, module.created_at)
            .map_err(invalid)?;
        guard.modules.insert(id, stored);
        Ok(id)
    }

    async fn update_module(
        &self,
        id: ModuleId,
        draft: &ModuleDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let created_at = guard
            .modules
            .get(&id)
            .map(Module::created_at)
            .ok_or(StorageError::NotFound)?;
        if guard.slug_taken(&draft.slug, Some(id)) {
            return Err(StorageError::Conflict);
        }
        let updated =
            Module::from_persisted(id, draft.clone(), created_at, updated_at).map_err(invalid)?;
        guard.modules.insert(id, updated);
        Ok(())
    }

    async fn delete_module(&self, id: ModuleId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        if guard.modules.remove(&id).is_none() {
            return Ok(false);
        }
        let orphaned: Vec<LessonId> = guard
            .lessons
            .values()
            .filter(|l| l.module_id() == id)
            .map(Lesson::id)
            .collect();
        guard.lessons.retain(|_, l| l.module_id() != id);
        guard
            .progress
            .retain(|_, p| !orphaned.contains(&p.lesson_id));
        Ok(true)
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.modules.get(&id).cloned())
    }

    async fn list_modules(&self, audience: Audience) -> Result<Vec<Module>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .modules
            .values()
            .filter(|m| audience.sees_unpublished() || m.is_published())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn insert_lesson(&self, lesson: NewLessonRecord) -> Result<LessonId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.modules.contains_key(&lesson.draft.module_id) {
            return Err(StorageError::NotFound);
        }
        let id = LessonId::new(guard.next_id());
        let stored = Lesson::from_persisted(id, lesson.draft, lesson.created_at, lesson.created_at)
            .map_err(invalid)?;
        guard.lessons.insert(id, stored);
        Ok(id)
    }

    async fn update_lesson(
        &self,
        id: LessonId,
        draft: &LessonDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let created_at = guard
            .lessons
            .get(&id)
            .map(Lesson::created_at)
            .ok_or(StorageError::NotFound)?;
        if !guard.modules.contains_key(&draft.module_id) {
            return Err(StorageError::NotFound);
        }
        let updated =
            Lesson::from_persisted(id, draft.clone(), created_at, updated_at).map_err(invalid)?;
        guard.lessons.insert(id, updated);
        Ok(())
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        if guard.lessons.remove(&id).is_none() {
            return Ok(false);
        }
        guard.progress.retain(|_, p| p.lesson_id != id);
        Ok(true)
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.lessons.get(&id).cloned())
    }

    async fn list_lessons(
        &self,
        module_id: ModuleId,
        audience: Audience,
    ) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lock()?;
        let mut lessons: Vec<Lesson> = guard
            .lessons
            .values()
            .filter(|l| l.module_id() == module_id)
            .filter(|l| audience.sees_unpublished() || l.is_published())
            .cloned()
            .collect();
        academy_core::progress::sort_lessons(&mut lessons);
        Ok(lessons)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn list_progress(&self, user_id: UserId) -> Result<Vec<ProgressEntry>, StorageError> {
        let guard = self.lock()?;
        guard
            .progress
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| guard.entry(p))
            .collect()
    }

    async fn mark_complete(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
        at: DateTime<Utc>,
    ) -> Result<ProgressEntry, StorageError> {
        let mut guard = self.lock()?;
        if !guard.lessons.contains_key(&lesson_id) {
            return Err(StorageError::NotFound);
        }

        let existing = guard
            .progress
            .values()
            .find(|p| p.user_id == user_id && p.lesson_id == lesson_id)
            .map(|p| p.id);

        let record = if let Some(id) = existing {
            let record = guard.progress.get_mut(&id).ok_or(StorageError::NotFound)?;
            if !record.completed {
                record.completed = true;
                record.completed_at = Some(at);
                record.updated_at = at;
            }
            record.clone()
        } else {
            let record = ProgressRecord {
                id: ProgressId::new(guard.next_id()),
                user_id,
                lesson_id,
                completed: true,
                completed_at: Some(at),
                created_at: at,
                updated_at: at,
            };
            guard.progress.insert(record.id, record.clone());
            record
        };

        guard.entry(&record)
    }

    async fn remove_progress(
        &self,
        user_id: UserId,
        lesson_id: LessonId,
    ) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        let before = guard.progress.len();
        guard
            .progress
            .retain(|_, p| !(p.user_id == user_id && p.lesson_id == lesson_id));
        Ok(guard.progress.len() != before)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserId, StorageError> {
        let mut guard = self.lock()?;
        if guard.users.values().any(|u| u.user.email() == &user.email) {
            return Err(StorageError::Conflict);
        }
        let id = UserId::new(guard.next_id());
        guard.users.insert(
            id,
            StoredUser {
                user: User::new(id, user.name, user.email, user.is_admin, user.created_at),
                password_hash: user.password_hash,
            },
        );
        Ok(id)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.users.get(&id).map(|u| u.user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .users
            .values()
            .find(|u| u.user.email() == email)
            .map(|u| StoredCredentials {
                user: u.user.clone(),
                password_hash: u.password_hash.clone(),
            }))
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryRepository {
    async fn insert_token(
        &self,
        user_id: UserId,
        token_hash: &str,
        _name: &str,
        _created_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&user_id) {
            return Err(StorageError::NotFound);
        }
        if guard.tokens.contains_key(token_hash) {
            return Err(StorageError::Conflict);
        }
        guard.tokens.insert(token_hash.to_owned(), user_id);
        Ok(())
    }

    async fn find_user_by_token(&self, token_hash: &str) -> Result<Option<User>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .tokens
            .get(token_hash)
            .and_then(|id| guard.users.get(id))
            .map(|u| u.user.clone()))
    }

    async fn revoke_token(&self, token_hash: &str) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        Ok(guard.tokens.remove(token_hash).is_some())
    }
}

#[async_trait]
impl HealthProbe for InMemoryRepository {
    async fn ping(&self) -> Result<(), StorageError> {
        self.lock().map(|_| ())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub modules: Arc<dyn ModuleRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn AccessTokenRepository>,
    pub health: Arc<dyn HealthProbe>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            modules: Arc::new(repo.clone()),
            lessons: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            users: Arc::new(repo.clone()),
            tokens: Arc::new(repo.clone()),
            health: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::LessonKind;
    use academy_core::time::fixed_now;
    use chrono::Duration;

    fn module_draft(slug: &str, published: bool) -> ModuleDraft {
        ModuleDraft {
            title: format!("Module {slug}"),
            slug: slug.to_owned(),
            description: "About".into(),
            category: "Beginner".into(),
            duration: None,
            thumbnail: None,
            is_published: published,
        }
    }

    fn lesson_draft(module_id: ModuleId, slug: &str, order: i64) -> LessonDraft {
        LessonDraft {
            module_id,
            title: format!("Lesson {slug}"),
            slug: slug.to_owned(),
            description: None,
            kind: LessonKind::Video,
            order,
            duration: None,
            video_url: None,
            document_url: None,
            content: None,
            is_published: true,
            is_free: false,
        }
    }

    async fn seeded() -> (InMemoryRepository, ModuleId, LessonId) {
        let repo = InMemoryRepository::new();
        let module_id = repo
            .insert_module(NewModuleRecord {
                draft: module_draft("intro", true),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let lesson_id = repo
            .insert_lesson(NewLessonRecord {
                draft: lesson_draft(module_id, "first", 1),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        (repo, module_id, lesson_id)
    }

    #[tokio::test]
    async fn mark_complete_twice_keeps_one_record_and_first_timestamp() {
        let (repo, _, lesson_id) = seeded().await;
        let user = UserId::new(100);

        let first = repo.mark_complete(user, lesson_id, fixed_now()).await.unwrap();
        let second = repo
            .mark_complete(user, lesson_id, fixed_now() + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.record.completed_at, Some(fixed_now()));
        assert_eq!(repo.list_progress(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_complete_unknown_lesson_is_not_found() {
        let (repo, _, _) = seeded().await;
        let err = repo
            .mark_complete(UserId::new(1), LessonId::new(999), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn remove_progress_reports_missing_record() {
        let (repo, _, lesson_id) = seeded().await;
        let user = UserId::new(100);
        assert!(!repo.remove_progress(user, lesson_id).await.unwrap());
        repo.mark_complete(user, lesson_id, fixed_now()).await.unwrap();
        assert!(repo.remove_progress(user, lesson_id).await.unwrap());
        assert!(repo.list_progress(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_module_cascades_to_lessons_and_progress() {
        let (repo, module_id, lesson_id) = seeded().await;
        let user = UserId::new(100);
        repo.mark_complete(user, lesson_id, fixed_now()).await.unwrap();

        assert!(repo.delete_module(module_id).await.unwrap());
        assert!(repo.get_lesson(lesson_id).await.unwrap().is_none());
        assert!(repo.list_progress(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_module_slug_conflicts() {
        let (repo, _, _) = seeded().await;
        let err = repo
            .insert_module(NewModuleRecord {
                draft: module_draft("intro", false),
                created_at: fixed_now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn public_module_list_hides_drafts() {
        let (repo, _, _) = seeded().await;
        repo.insert_module(NewModuleRecord {
            draft: module_draft("draft", false),
            created_at: fixed_now(),
        })
        .await
        .unwrap();

        assert_eq!(repo.list_modules(Audience::Public).await.unwrap().len(), 1);
        assert_eq!(repo.list_modules(Audience::Admin).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn lessons_are_listed_in_display_order() {
        let (repo, module_id, first) = seeded().await;
        let zeroth = repo
            .insert_lesson(NewLessonRecord {
                draft: lesson_draft(module_id, "zeroth", 0),
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let ids: Vec<LessonId> = repo
            .list_lessons(module_id, Audience::Public)
            .await
            .unwrap()
            .iter()
            .map(Lesson::id)
            .collect();
        assert_eq!(ids, vec![zeroth, first]);
    }
}
