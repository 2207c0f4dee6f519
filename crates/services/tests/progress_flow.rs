use academy_core::model::{
    Audience, LessonDraft, LessonKind, ModuleDraft, RegistrationDraft,
};
use academy_core::time::fixed_now;
use services::{AppServices, Clock, ProgressServiceError};
use storage::repository::Storage;

async fn app(name: &str) -> AppServices {
    let storage = Storage::sqlite(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect sqlite");
    AppServices::from_storage(&storage, Clock::fixed(fixed_now()))
}

fn registration(email: &str) -> RegistrationDraft {
    RegistrationDraft {
        name: "Learner".into(),
        email: email.into(),
        password: "password123".into(),
        password_confirmation: "password123".into(),
    }
}

fn lesson(module_id: academy_core::model::ModuleId, slug: &str, order: i64) -> LessonDraft {
    LessonDraft {
        module_id,
        title: format!("Lesson {order}"),
        slug: slug.into(),
        description: None,
        kind: LessonKind::Video,
        order,
        duration: Some("10:00".into()),
        video_url: Some("https://www.youtube.com/embed/SSo_EIwHSd4".into()),
        document_url: None,
        content: None,
        is_published: true,
        is_free: order == 1,
    }
}

#[tokio::test]
async fn learner_walks_through_a_module() {
    let app = app("memdb_progress_walkthrough").await;
    let auth = app.auth();
    let catalog = app.catalog();
    let progress = app.progress();

    auth.create_admin(registration("admin@example.com"))
        .await
        .expect("create admin");
    let admin = auth
        .login("admin@example.com", "password123")
        .await
        .expect("admin login");
    let admin = auth.authenticate(&admin.token).await.expect("admin identity");

    let module = catalog
        .create_module(
            admin,
            ModuleDraft {
                title: "Introduction to Blockchain".into(),
                slug: "introduction-to-blockchain".into(),
                description: "Learn the fundamentals of blockchain technology".into(),
                category: "Beginner".into(),
                duration: Some("45 min".into()),
                thumbnail: None,
                is_published: true,
            },
        )
        .await
        .expect("create module");
    // Created out of order on purpose.
    let l2 = catalog
        .create_lesson(admin, lesson(module.id(), "how-blocks-link", 2))
        .await
        .expect("create l2");
    let l1 = catalog
        .create_lesson(admin, lesson(module.id(), "what-is-blockchain", 1))
        .await
        .expect("create l1");

    let view = catalog
        .get_module(Audience::Public, module.id())
        .await
        .expect("public module");
    let order: Vec<_> = view.lessons.iter().map(|l| l.id()).collect();
    assert_eq!(order, vec![l1.id(), l2.id()]);

    let learner = auth
        .register(registration("learner@example.com"))
        .await
        .expect("register");
    let learner = auth.authenticate(&learner.token).await.expect("identity");

    let entry = progress
        .mark_complete(learner, l1.id())
        .await
        .expect("mark l1");
    assert_eq!(entry.lesson.module_id, module.id());
    let figures = progress
        .module_progress(learner, module.id())
        .await
        .expect("progress");
    assert_eq!(figures.percentage, 50);

    progress
        .mark_complete(learner, l2.id())
        .await
        .expect("mark l2");
    let figures = progress
        .module_progress(learner, module.id())
        .await
        .expect("progress");
    assert_eq!(figures.percentage, 100);

    progress
        .mark_incomplete(learner, l1.id())
        .await
        .expect("unmark l1");
    let entries = progress.list(learner).await.expect("list");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].lesson_id(), l2.id());
    let figures = progress
        .module_progress(learner, module.id())
        .await
        .expect("progress");
    assert_eq!(figures.percentage, 50);

    let err = progress
        .mark_incomplete(learner, l1.id())
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressServiceError::ProgressNotFound));
}

#[tokio::test]
async fn empty_module_reports_zero_percent() {
    let app = app("memdb_progress_empty_module").await;
    let auth = app.auth();
    auth.create_admin(registration("admin@example.com"))
        .await
        .expect("create admin");
    let admin = auth
        .login("admin@example.com", "password123")
        .await
        .expect("login");
    let admin = auth.authenticate(&admin.token).await.expect("identity");

    let module = app
        .catalog()
        .create_module(
            admin,
            ModuleDraft {
                title: "DeFi Protocol Analysis".into(),
                slug: "defi-protocol-analysis".into(),
                description: "Lending, AMMs and yield".into(),
                category: "Advanced".into(),
                is_published: true,
                ..ModuleDraft::default()
            },
        )
        .await
        .expect("create module");

    let figures = app
        .progress()
        .module_progress(admin, module.id())
        .await
        .expect("progress");
    assert_eq!((figures.total_lessons, figures.percentage), (0, 0));
    assert!(app.database_available().await);
}
