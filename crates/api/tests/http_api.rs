use academy_core::model::RegistrationDraft;
use academy_core::time::fixed_now;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use services::{AppServices, Clock};
use storage::repository::Storage;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    services: AppServices,
}

impl TestApp {
    fn new() -> Self {
        Self::over(AppServices::from_storage(
            &Storage::in_memory(),
            Clock::fixed(fixed_now()),
        ))
    }

    async fn sqlite(name: &str) -> Self {
        let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
        let services = AppServices::new_sqlite(&url, Clock::fixed(fixed_now()))
            .await
            .unwrap();
        Self::over(services)
    }

    fn over(services: AppServices) -> Self {
        Self {
            router: api::router(services.clone()),
            services,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn admin_token(&self) -> String {
        self.services
            .auth()
            .create_admin(RegistrationDraft {
                name: "Admin".into(),
                email: "admin@example.com".into(),
                password: "password123".into(),
                password_confirmation: "password123".into(),
            })
            .await
            .unwrap();
        let (status, body) = self
            .send(
                Method::POST,
                "/api/login",
                None,
                Some(json!({ "email": "admin@example.com", "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_owned()
    }

    async fn learner_token(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/register",
                None,
                Some(json!({
                    "name": "Learner",
                    "email": email,
                    "password": "password123",
                    "password_confirmation": "password123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");
        body["token"].as_str().unwrap().to_owned()
    }

    async fn create_module(&self, admin: &str, slug: &str, published: bool) -> u64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/modules",
                Some(admin),
                Some(json!({
                    "title": "Introduction to Blockchain",
                    "slug": slug,
                    "description": "Learn the fundamentals",
                    "category": "Beginner",
                    "duration": "45 min",
                    "is_published": published,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_u64().unwrap()
    }

    async fn create_lesson(&self, admin: &str, module_id: u64, slug: &str, order: i64) -> u64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/admin/lessons",
                Some(admin),
                Some(json!({
                    "module_id": module_id,
                    "title": format!("Lesson {order}"),
                    "slug": slug,
                    "type": "video",
                    "order": order,
                    "video_url": "https://www.youtube.com/embed/SSo_EIwHSd4",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_u64().unwrap()
    }
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "API is working");
    assert_eq!(body["database"], "connected");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn progress_routes_require_a_valid_token() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/progress", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthenticated.");

    let (status, _) = app
        .send(Method::GET, "/api/progress", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/progress",
            None,
            Some(json!({ "lesson_id": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn completion_walkthrough_over_http() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let module_id = app.create_module(&admin, "intro", true).await;
    let l1 = app.create_lesson(&admin, module_id, "l1", 1).await;
    let l2 = app.create_lesson(&admin, module_id, "l2", 2).await;
    let learner = app.learner_token("learner@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/progress",
            Some(&learner),
            Some(json!({ "lesson_id": l1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["completed"], true);
    assert_eq!(body["lesson"]["module_id"], module_id);
    let completed_at = body["completed_at"].clone();

    // Repeat with a string id: same record, still 201.
    let (status, again) = app
        .send(
            Method::POST,
            "/api/progress",
            Some(&learner),
            Some(json!({ "lesson_id": l1.to_string() })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(again["id"], body["id"]);
    assert_eq!(again["completed_at"], completed_at);

    let progress_uri = format!("/api/modules/{module_id}/progress");
    let (_, figures) = app.send(Method::GET, &progress_uri, Some(&learner), None).await;
    assert_eq!(figures["percentage"], 50);

    app.send(
        Method::POST,
        "/api/progress",
        Some(&learner),
        Some(json!({ "lesson_id": l2 })),
    )
    .await;
    let (_, figures) = app.send(Method::GET, &progress_uri, Some(&learner), None).await;
    assert_eq!(figures["percentage"], 100);
    assert_eq!(figures["completed_lessons"], 2);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/progress/{l1}"), Some(&learner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Progress removed successfully");

    let (_, list) = app.send(Method::GET, "/api/progress", Some(&learner), None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["lesson_id"], l2);

    let (status, body) = app
        .send(Method::DELETE, &format!("/api/progress/{l1}"), Some(&learner), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Progress not found");

    let (_, figures) = app.send(Method::GET, &progress_uri, Some(&learner), None).await;
    assert_eq!(figures["percentage"], 50);
}

#[tokio::test]
async fn malformed_lesson_ids_are_validation_errors() {
    let app = TestApp::new();
    let learner = app.learner_token("learner@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/progress",
            Some(&learner),
            Some(json!({ "lesson_id": "abc" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["lesson_id"].is_array());

    let (status, _) = app
        .send(Method::DELETE, "/api/progress/abc", Some(&learner), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/progress",
            Some(&learner),
            Some(json!({ "lesson_id": 404 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unpublished_module_gates_its_lessons() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let hidden = app.create_module(&admin, "hidden", false).await;
    let lesson = app.create_lesson(&admin, hidden, "secret", 1).await;
    let learner = app.learner_token("learner@example.com").await;

    let (_, modules) = app.send(Method::GET, "/api/modules", None, None).await;
    assert!(modules.as_array().unwrap().is_empty());

    for uri in [
        format!("/api/modules/{hidden}"),
        format!("/api/modules/{hidden}/lessons"),
        format!("/api/modules/{hidden}/lessons/{lesson}"),
    ] {
        let (status, _) = app.send(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }

    let (status, _) = app
        .send(
            Method::POST,
            "/api/progress",
            Some(&learner),
            Some(json!({ "lesson_id": lesson })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(Method::GET, "/api/admin/modules", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn lesson_detail_includes_navigation() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let module_id = app.create_module(&admin, "nav", true).await;
    let l2 = app.create_lesson(&admin, module_id, "second", 2).await;
    let l1 = app.create_lesson(&admin, module_id, "first", 1).await;

    let (status, body) = app
        .send(Method::GET, &format!("/api/modules/{module_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body["lessons"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![l1, l2]);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/modules/{module_id}/lessons/{l1}"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "video");
    assert_eq!(body["navigation"]["previous_lesson_id"], Value::Null);
    assert_eq!(body["navigation"]["next_lesson_id"], l2);
}

#[tokio::test]
async fn admin_surface_rejects_learners() {
    let app = TestApp::new();
    let learner = app.learner_token("learner@example.com").await;

    let (status, _) = app
        .send(Method::GET, "/api/admin/modules", Some(&learner), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/api/admin/modules", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_edits_and_deletes_catalog_entries() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let module_id = app.create_module(&admin, "edit-me", false).await;
    let lesson_id = app.create_lesson(&admin, module_id, "l1", 1).await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/api/admin/modules/{module_id}"),
            Some(&admin),
            Some(json!({
                "title": "Renamed",
                "slug": "edit-me",
                "description": "Updated",
                "category": "Beginner",
                "is_published": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Renamed");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/admin/modules",
            Some(&admin),
            Some(json!({
                "title": "Dup",
                "slug": "edit-me",
                "description": "Dup",
                "category": "Beginner",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["slug"].is_array());

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/admin/lessons/{lesson_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/admin/modules/{module_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/admin/modules/{module_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_failure_and_logout() {
    let app = TestApp::new();
    let token = app.learner_token("learner@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({ "email": "learner@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "The provided credentials are incorrect.");

    let (status, body) = app.send(Method::GET, "/api/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "learner@example.com");

    let (status, _) = app.send(Method::POST, "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, "/api/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ids_beyond_the_storable_range_never_reach_sqlite() {
    let app = TestApp::sqlite("http_api_id_range").await;
    let admin = app.admin_token().await;
    let learner = app.learner_token("range@example.com").await;

    let (status, _) = app
        .send(Method::GET, "/api/modules/9223372036854775807", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let too_big = "9223372036854775808";
    for uri in [
        format!("/api/modules/{too_big}"),
        format!("/api/modules/{too_big}/lessons"),
        format!("/api/modules/1/lessons/{too_big}"),
    ] {
        let (status, body) = app.send(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert!(body["message"].as_str().unwrap().contains("must be an integer"));
    }

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/modules/{too_big}/progress"),
            Some(&learner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/progress/{too_big}"),
            Some(&learner),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/progress",
            Some(&learner),
            Some(json!({ "lesson_id": 9_223_372_036_854_775_808_u64 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["lesson_id"][0], "The lesson id field must be an integer.");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/progress",
            Some(&learner),
            Some(json!({ "lesson_id": 9_223_372_036_854_775_807_u64 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/admin/modules/{too_big}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
