use crate::domain::task::Task;
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save_user(&self, user: User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn save(&self, task: Task) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Task>>;
    /// Tasks belonging to one owner, oldest first.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Task>>;
    async fn update(&self, task: Task) -> Result<()>;
    /// Returns `true` if a record was actually removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}
