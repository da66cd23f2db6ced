use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use task_tracker_api::application::auth_service::AuthService;
use task_tracker_api::application::task_service::TaskService;
use task_tracker_api::data::task_repository::InMemoryTaskRepository;
use task_tracker_api::data::user_repository::InMemoryUserRepository;
use task_tracker_api::infrastructure::config::AppConfig;
use task_tracker_api::infrastructure::logging::init_logging;
use task_tracker_api::presentation::auth::{login, register};
use task_tracker_api::presentation::handlers::{
    AppState, create_task, delete_task, health_check, list_tasks, update_task,
};
use task_tracker_api::presentation::middleware::{JwtAuthMiddleware, RequestLogMiddleware};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    info!(host = %config.host, port = config.port, "Configuration loaded");

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let task_repository = Arc::new(InMemoryTaskRepository::new());
    info!("Repositories created");

    let jwt_secret = config.jwt_secret.clone();
    let state = web::Data::new(AppState {
        auth_service: Arc::new(AuthService::new(user_repository, jwt_secret.clone())),
        task_service: TaskService::new(task_repository),
    });
    info!("Application state initialized");

    let server = HttpServer::new(move || {
        // Dev frontend origins; the API itself is same-machine
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://localhost:3001")
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(state.clone())
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .wrap(RequestLogMiddleware)
            .wrap(cors)
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(health_check))
                    .route("/users", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/tasks", web::get().to(list_tasks))
                    .route("/tasks", web::post().to(create_task))
                    .route("/tasks/{id}", web::put().to(update_task))
                    .route("/tasks/{id}", web::delete().to(delete_task)),
            )
    });

    let server = server.bind((config.host.as_str(), config.port))?;
    info!(host = %config.host, port = config.port, "Starting HTTP server");
    server.run().await?;
    Ok(())
}
