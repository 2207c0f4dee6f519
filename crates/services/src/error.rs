//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::model::{LessonError, ModuleError, UserError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error("module not found")]
    ModuleNotFound,
    #[error("lesson not found")]
    LessonNotFound,
    #[error("administrator access required")]
    Forbidden,
    #[error("the slug has already been taken")]
    SlugTaken,
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CatalogServiceError {
    /// Input field a rejected edit refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CatalogServiceError::SlugTaken => Some("slug"),
            CatalogServiceError::Module(err) => Some(err.field()),
            CatalogServiceError::Lesson(err) => Some(err.field()),
            _ => None,
        }
    }
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("lesson not found")]
    LessonNotFound,
    #[error("module not found")]
    ModuleNotFound,
    #[error("Progress not found")]
    ProgressNotFound,
    /// Storage failed while recording a completion; details are logged only.
    #[error("Failed to mark lesson as complete.")]
    RecordFailed,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthServiceError {
    #[error("The provided credentials are incorrect.")]
    InvalidCredentials,
    #[error("The email has already been taken.")]
    EmailTaken,
    #[error("Unauthenticated.")]
    Unauthenticated,
    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthServiceError {
    /// Input field a rejected registration or login refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AuthServiceError::User(err) => Some(err.field()),
            AuthServiceError::EmailTaken | AuthServiceError::InvalidCredentials => Some("email"),
            _ => None,
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
