//! HTTP surface of the academy backend.
//!
//! Everything lives under `/api`. Learner-facing catalog reads are public,
//! progress and account routes need a bearer token, and `/api/admin/...`
//! additionally needs an administrator account.

#![forbid(unsafe_code)]

use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use services::AppServices;

/// Build the full router over the given services.
pub fn router(services: AppServices) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, ACCEPT])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/user", get(routes::auth::current_user))
        .route("/modules", get(routes::catalog::list_modules))
        .route("/modules/{id}", get(routes::catalog::show_module))
        .route("/modules/{id}/lessons", get(routes::catalog::list_lessons))
        .route(
            "/modules/{id}/lessons/{lesson_id}",
            get(routes::catalog::show_lesson),
        )
        .route("/modules/{id}/progress", get(routes::progress::module_progress))
        .route(
            "/progress",
            get(routes::progress::list).post(routes::progress::mark_complete),
        )
        .route("/progress/{lesson_id}", delete(routes::progress::mark_incomplete))
        .route(
            "/admin/modules",
            get(routes::admin::list_modules).post(routes::admin::create_module),
        )
        .route(
            "/admin/modules/{id}",
            put(routes::admin::update_module).delete(routes::admin::delete_module),
        )
        .route("/admin/modules/{id}/lessons", get(routes::admin::list_lessons))
        .route("/admin/lessons", post(routes::admin::create_lesson))
        .route(
            "/admin/lessons/{id}",
            put(routes::admin::update_lesson).delete(routes::admin::delete_lesson),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState::new(services))
}
