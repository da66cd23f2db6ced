use crate::application::auth_service::AuthService;
use crate::application::task_service::TaskService;
use crate::data::task_repository::InMemoryTaskRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::task::{CreateTask, UpdateTask};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub auth_service: Arc<AuthService<InMemoryUserRepository>>,
    pub task_service: TaskService<InMemoryTaskRepository>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Rejected login. Kept generic and distinct from `Auth` because the
    /// login endpoint answers 400, while token failures answer 401.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Missing/invalid/expired token, or an authenticated caller acting
    /// on a record they do not own.
    #[error("Unauthorized: {0}")]
    Auth(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_) => actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Storage(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            ApiError::Validation(msg) => serde_json::json!({ "message": msg }),
            ApiError::Conflict(msg) => serde_json::json!({ "message": msg }),
            ApiError::InvalidCredentials => {
                serde_json::json!({ "message": "Invalid credentials" })
            }
            ApiError::Auth(msg) => serde_json::json!({ "message": msg }),
            ApiError::NotFound(msg) => serde_json::json!({ "message": msg }),
            // Internal detail stays out of the response body
            ApiError::Storage(_) | ApiError::Internal(_) => {
                serde_json::json!({ "message": "Server error" })
            }
        };

        match self {
            ApiError::Validation(_) => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            ApiError::Conflict(_) => {
                warn!(error = %error_msg, status = %status, "Conflict")
            }
            ApiError::InvalidCredentials => {
                warn!(status = %status, "Invalid credentials")
            }
            ApiError::Auth(_) => {
                warn!(error = %error_msg, status = %status, "Unauthorized")
            }
            ApiError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            ApiError::Storage(_) => {
                error!(error = %error_msg, status = %status, "Storage error")
            }
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: match self {
                ApiError::Storage(_) | ApiError::Internal(_) => "Server error".to_string(),
                _ => error_msg,
            },
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::Conflict(msg)) => ApiError::Conflict(msg.clone()),
            Some(DomainError::Unauthorized(_)) => ApiError::InvalidCredentials,
            Some(DomainError::NotAuthorized(msg)) => ApiError::Auth(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Storage(err.to_string()),
        }
    }
}

// AuthenticatedUser extractor
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Auth("No token, authorization denied".to_string()))
        })
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[derive(Serialize)]
struct DeleteResponse {
    msg: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state, user), fields(owner_id = %user.0.user_id))]
pub async fn list_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let tasks = state.task_service.list(&user.0).await.map_err(|e| {
        error!(error = %e, "Failed to list tasks");
        ApiError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[instrument(skip(state, user, req), fields(owner_id = %user.0.user_id))]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateTask>,
) -> Result<HttpResponse, ApiError> {
    let task = state
        .task_service
        .create(&user.0, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create task");
            ApiError::from(e)
        })?;
    info!(task_id = %task.id, "Task created");
    Ok(HttpResponse::Created().json(task))
}

#[instrument(skip(state, user, req), fields(task_id = %*path, owner_id = %user.0.user_id))]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    req: web::Json<UpdateTask>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    let task = state
        .task_service
        .update(&task_id, &user.0, req.into_inner())
        .await
        .map_err(|e| {
            warn!(task_id = %task_id, error = %e, "Failed to update task");
            ApiError::from(e)
        })?;
    Ok(HttpResponse::Ok().json(task))
}

#[instrument(skip(state, user), fields(task_id = %*path, owner_id = %user.0.user_id))]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    state
        .task_service
        .delete(&task_id, &user.0)
        .await
        .map_err(|e| {
            warn!(task_id = %task_id, error = %e, "Failed to delete task");
            ApiError::from(e)
        })?;
    Ok(HttpResponse::Ok().json(DeleteResponse {
        msg: "Task removed".to_string(),
    }))
}
