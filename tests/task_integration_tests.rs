use actix_web::{App, test, web};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use task_tracker_api::application::auth_service::AuthService;
use task_tracker_api::application::task_service::TaskService;
use task_tracker_api::data::task_repository::InMemoryTaskRepository;
use task_tracker_api::data::user_repository::InMemoryUserRepository;
use task_tracker_api::presentation::auth::{login, register};
use task_tracker_api::presentation::handlers::{
    AppState, create_task, delete_task, health_check, list_tasks, update_task,
};
use task_tracker_api::presentation::middleware::JwtAuthMiddleware;

const TEST_SECRET: &str = "test-secret-key-for-task-tests";

macro_rules! setup_task_test {
    () => {{
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let task_repository = Arc::new(InMemoryTaskRepository::new());

        let state = web::Data::new(AppState {
            auth_service: Arc::new(AuthService::new(user_repository, TEST_SECRET.to_string())),
            task_service: TaskService::new(task_repository),
        });

        test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(JwtAuthMiddleware::new(TEST_SECRET.to_string()))
                .service(
                    web::scope("/api")
                        .route("/health", web::get().to(health_check))
                        .route("/users", web::post().to(register))
                        .route("/login", web::post().to(login))
                        .route("/tasks", web::get().to(list_tasks))
                        .route("/tasks", web::post().to(create_task))
                        .route("/tasks/{id}", web::put().to(update_task))
                        .route("/tasks/{id}", web::delete().to(delete_task)),
                ),
        )
        .await
    }};
}

/// Registers a user through the API and returns their session token.
macro_rules! register_user {
    ($app:expr, $name:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(serde_json::json!({
                "name": $name,
                "email": $email,
                "password": "secret1",
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn test_full_task_lifecycle() {
    let app = setup_task_test!();

    // Register and log in
    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(serde_json::json!({
            "name": "A",
            "email": "a@x.com",
            "password": "secret1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(serde_json::json!({
            "email": "a@x.com",
            "password": "secret1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap().to_string();

    // Fresh account has no tasks
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", token.clone()))
        .to_request();
    let tasks: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks, serde_json::json!([]));

    // Create a task; status defaults to pending
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", token.clone()))
        .set_json(serde_json::json!({ "task": "buy milk" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let created: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(created["task"], "buy milk");
    assert_eq!(created["status"], "pending");
    let task_id = created["id"].as_str().unwrap().to_string();

    // Complete it
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .insert_header(("x-auth-token", token.clone()))
        .set_json(serde_json::json!({ "task": "buy milk", "status": "completed" }))
        .to_request();
    let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["id"], task_id.as_str());

    // Delete it
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id))
        .insert_header(("x-auth-token", token.clone()))
        .to_request();
    let deleted: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted["msg"], "Task removed");

    // Gone
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", token))
        .to_request();
    let tasks: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks, serde_json::json!([]));
}

#[actix_web::test]
async fn test_tasks_require_token() {
    let app = setup_task_test!();

    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .set_json(serde_json::json!({ "task": "no token" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_garbage_token_is_rejected() {
    let app = setup_task_test!();

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", "not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = setup_task_test!();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &serde_json::json!({
            "sub": "someone",
            "name": "Someone",
            "iat": now,
            "exp": now + 3600,
        }),
        &jsonwebtoken::EncodingKey::from_secret("some-other-secret".as_ref()),
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", forged))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_expired_token_is_rejected() {
    let app = setup_task_test!();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &serde_json::json!({
            "sub": "someone",
            "name": "Someone",
            "iat": now - 7200,
            "exp": now - 3600,
        }),
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET.as_ref()),
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", expired))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["details"]["message"], "Token expired");
}

#[actix_web::test]
async fn test_listing_is_scoped_to_owner() {
    let app = setup_task_test!();
    let alice = register_user!(app, "Alice", "alice@x.com");
    let bob = register_user!(app, "Bob", "bob@x.com");

    for text in ["a1", "a2"] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .insert_header(("x-auth-token", alice.clone()))
            .set_json(serde_json::json!({ "task": text }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", bob.clone()))
        .to_request();
    let tasks: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks, serde_json::json!([]));

    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", alice))
        .to_request();
    let tasks: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_non_owner_cannot_mutate() {
    let app = setup_task_test!();
    let alice = register_user!(app, "Alice", "alice@x.com");
    let bob = register_user!(app, "Bob", "bob@x.com");

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", alice.clone()))
        .set_json(serde_json::json!({ "task": "private" }))
        .to_request();
    let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let task_id = created["id"].as_str().unwrap().to_string();

    // Bob cannot update Alice's task
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .insert_header(("x-auth-token", bob.clone()))
        .set_json(serde_json::json!({ "task": "hijacked", "status": "completed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // Bob cannot delete it either
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id))
        .insert_header(("x-auth-token", bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // Alice's task is untouched
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", alice))
        .to_request();
    let tasks: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["task"], "private");
    assert_eq!(tasks[0]["status"], "pending");
}

#[actix_web::test]
async fn test_missing_task_is_not_found_not_forbidden() {
    let app = setup_task_test!();
    let token = register_user!(app, "A", "a@x.com");

    let req = test::TestRequest::delete()
        .uri("/api/tasks/no-such-id")
        .insert_header(("x-auth-token", token.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri("/api/tasks/no-such-id")
        .insert_header(("x-auth-token", token))
        .set_json(serde_json::json!({ "task": "x", "status": "pending" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_with_explicit_status() {
    let app = setup_task_test!();
    let token = register_user!(app, "A", "a@x.com");

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", token))
        .set_json(serde_json::json!({ "task": "already done", "status": "completed" }))
        .to_request();
    let created: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["status"], "completed");
}

#[actix_web::test]
async fn test_create_rejects_blank_text() {
    let app = setup_task_test!();
    let token = register_user!(app, "A", "a@x.com");

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(("x-auth-token", token))
        .set_json(serde_json::json!({ "task": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_health_check_is_public() {
    let app = setup_task_test!();

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}
