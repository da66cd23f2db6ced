use crate::domain::error::DomainError;
use crate::domain::repository::TaskRepository;
use crate::domain::task::{CreateTask, Task, UpdateTask};
use crate::infrastructure::security::Identity;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, req), fields(owner_id = %identity.user_id))]
    pub async fn create(&self, identity: &Identity, req: CreateTask) -> Result<Task> {
        if req.task.trim().is_empty() {
            return Err(DomainError::Validation("Task text is required".to_string()).into());
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            text: req.task,
            status: req.status,
            created_at: Utc::now(),
            owner_id: identity.user_id.clone(),
        };
        self.repository.save(task.clone()).await?;

        info!(task_id = %task.id, owner_id = %task.owner_id, "Task created");
        Ok(task)
    }

    /// Listing is pre-scoped by owner at the query level, so no per-record
    /// ownership check is needed here.
    #[instrument(skip(self), fields(owner_id = %identity.user_id))]
    pub async fn list(&self, identity: &Identity) -> Result<Vec<Task>> {
        let tasks = self.repository.find_by_owner(&identity.user_id).await?;
        debug!(count = tasks.len(), "Tasks listed");
        Ok(tasks)
    }

    #[instrument(skip(self, req), fields(task_id = task_id, owner_id = %identity.user_id))]
    pub async fn update(&self, task_id: &str, identity: &Identity, req: UpdateTask) -> Result<Task> {
        if req.task.trim().is_empty() {
            return Err(DomainError::Validation("Task text is required".to_string()).into());
        }

        let mut task = self.load_owned(task_id, identity).await?;
        task.text = req.task;
        task.status = req.status;
        self.repository.update(task.clone()).await?;

        info!(task_id = %task.id, "Task updated");
        Ok(task)
    }

    #[instrument(skip(self), fields(task_id = task_id, owner_id = %identity.user_id))]
    pub async fn delete(&self, task_id: &str, identity: &Identity) -> Result<()> {
        self.load_owned(task_id, identity).await?;
        self.repository.delete(task_id).await?;

        info!(task_id = task_id, "Task removed");
        Ok(())
    }

    /// Existence is checked before ownership: probing a nonexistent id
    /// reports "not found" rather than "not authorized".
    async fn load_owned(&self, task_id: &str, identity: &Identity) -> Result<Task> {
        let task = self
            .repository
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Task not found".to_string()))?;

        authorize_task_mutation(&task, identity)?;
        Ok(task)
    }
}

/// Permits a mutation only when the caller owns the task.
pub fn authorize_task_mutation(task: &Task, identity: &Identity) -> Result<(), DomainError> {
    if task.owner_id != identity.user_id {
        warn!(
            task_id = %task.id,
            owner_id = %task.owner_id,
            caller_id = %identity.user_id,
            "Mutation denied, caller does not own task"
        );
        return Err(DomainError::NotAuthorized("Not authorized".to_string()));
    }
    Ok(())
}
