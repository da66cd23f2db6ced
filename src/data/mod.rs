pub mod task_repository;
pub mod user_repository;
