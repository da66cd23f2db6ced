use crate::domain::repository::TaskRepository;
use crate::domain::task::Task;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryTaskRepository {
    storage: Arc<RwLock<HashMap<String, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    #[instrument(skip(self), fields(task_id = %task.id, owner_id = %task.owner_id))]
    async fn save(&self, task: Task) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(task.id.clone(), task.clone());
        debug!(task_id = %task.id, "Task saved");
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = id))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Task>> {
        let storage = self.storage.read().await;
        let task = storage.get(id).cloned();
        trace!(found = task.is_some(), "Looked up task by id");
        Ok(task)
    }

    #[instrument(skip(self), fields(owner_id = owner_id))]
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Task>> {
        let storage = self.storage.read().await;
        let mut tasks: Vec<Task> = storage
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        trace!(count = tasks.len(), "Listed tasks for owner");
        Ok(tasks)
    }

    #[instrument(skip(self), fields(task_id = %task.id))]
    async fn update(&self, task: Task) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(task.id.clone(), task.clone());
        debug!(task_id = %task.id, "Task updated");
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = id))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let mut storage = self.storage.write().await;
        let removed = storage.remove(id).is_some();
        debug!(task_id = id, removed = removed, "Task delete attempted");
        Ok(removed)
    }
}
