use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// The to-do text itself. Serialized as `task` to match the wire format.
    #[serde(rename = "task")]
    pub text: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub owner_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTask {
    pub task: String,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTask {
    pub task: String,
    pub status: TaskStatus,
}
