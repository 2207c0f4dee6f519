#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod catalog_service;
pub mod credentials;
pub mod error;
pub mod progress_service;

pub use academy_core::Clock;

pub use app_services::AppServices;
pub use auth_service::{AuthService, IssuedToken};
pub use catalog_service::{CatalogService, LessonView, ModuleWithLessons};
pub use error::{AppServicesError, AuthServiceError, CatalogServiceError, ProgressServiceError};
pub use progress_service::ProgressService;
