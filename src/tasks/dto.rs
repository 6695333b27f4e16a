use serde::{Deserialize, Serialize};

use crate::tasks::{
    repo_types::{Task, TaskStatus},
    services::TaskInput,
};

/// Body of `POST /tasks` and `PUT /tasks/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskRequest {
    #[serde(default)]
    pub title: String,
    pub content: Option<String>,
    pub status: Option<String>,
}

impl From<TaskRequest> for TaskInput {
    fn from(r: TaskRequest) -> Self {
        Self {
            title: r.title,
            content: r.content,
            status: r.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskItem {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub status: TaskStatus,
}

impl From<Task> for TaskItem {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            content: t.content,
            status: t.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskMessage {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreatedTaskResponse {
    pub message: &'static str,
    pub id: i64,
}
