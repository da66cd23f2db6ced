pub mod auth_service;
pub mod task_service;
