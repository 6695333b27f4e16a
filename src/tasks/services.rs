use tracing::{debug, info};

use crate::{
    error::AppError,
    tasks::{
        repo::TaskStore,
        repo_types::{Task, TaskFields, TaskStatus},
    },
};

/// Untrusted task input as it arrives from a client.
#[derive(Debug, Default, Clone)]
pub struct TaskInput {
    pub title: String,
    pub content: Option<String>,
    pub status: Option<String>,
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    Ok(())
}

/// Creates a task owned by `owner_id`. Status defaults to `todo`.
pub async fn create_task(
    store: &dyn TaskStore,
    owner_id: i64,
    input: TaskInput,
) -> Result<i64, AppError> {
    validate_title(&input.title)?;
    let status = TaskStatus::parse_optional(input.status.as_deref())?.unwrap_or_default();

    let fields = TaskFields {
        title: input.title,
        content: input.content,
        status,
    };
    let id = store.insert(owner_id, &fields).await?;
    info!(task_id = id, owner_id, %status, "task created");
    Ok(id)
}

pub async fn list_tasks(store: &dyn TaskStore, owner_id: i64) -> Result<Vec<Task>, AppError> {
    let tasks = store.list_by_owner(owner_id).await?;
    debug_assert!(tasks.iter().all(|t| t.owner_id == owner_id));
    debug!(owner_id, count = tasks.len(), "tasks listed");
    Ok(tasks)
}

/// Replaces title and content of an owned task. Omitting the status keeps the
/// stored one. A task owned by someone else is reported exactly like a
/// missing one.
pub async fn update_task(
    store: &dyn TaskStore,
    task_id: i64,
    owner_id: i64,
    input: TaskInput,
) -> Result<(), AppError> {
    validate_title(&input.title)?;
    let status = match TaskStatus::parse_optional(input.status.as_deref())? {
        Some(s) => s,
        None => store
            .status_of(task_id, owner_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?,
    };

    let fields = TaskFields {
        title: input.title,
        content: input.content,
        status,
    };
    // Only the owner-filtered statement decides; never compare owners in memory.
    if store.update(task_id, owner_id, &fields).await? == 0 {
        return Err(AppError::NotFound("Task"));
    }
    info!(task_id, owner_id, %status, "task updated");
    Ok(())
}

pub async fn delete_task(store: &dyn TaskStore, task_id: i64, owner_id: i64) -> Result<(), AppError> {
    if store.delete(task_id, owner_id).await? == 0 {
        return Err(AppError::NotFound("Task"));
    }
    info!(task_id, owner_id, "task deleted");
    Ok(())
}
