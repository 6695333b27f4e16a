use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiJson, AppError},
    state::AppState,
    tasks::{
        dto::{CreatedTaskResponse, TaskItem, TaskMessage, TaskRequest},
        services::{create_task, delete_task, list_tasks, update_task},
    },
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list).post(create))
        .route("/tasks/:id", put(update).delete(remove))
}

fn parse_task_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::validation("Invalid task id"))
}

#[instrument(skip(state, me, payload), fields(user_id = me.user_id))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    ApiJson(payload): ApiJson<TaskRequest>,
) -> Result<Json<CreatedTaskResponse>, AppError> {
    let id = create_task(state.tasks.as_ref(), me.user_id, payload.into()).await?;
    Ok(Json(CreatedTaskResponse {
        message: "Task created successfully!",
        id,
    }))
}

#[instrument(skip(state, me), fields(user_id = me.user_id))]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> Result<Json<Vec<TaskItem>>, AppError> {
    let tasks = list_tasks(state.tasks.as_ref(), me.user_id).await?;
    Ok(Json(tasks.into_iter().map(TaskItem::from).collect()))
}

#[instrument(skip(state, me, payload), fields(user_id = me.user_id))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<TaskRequest>,
) -> Result<Json<TaskMessage>, AppError> {
    let task_id = parse_task_id(&id)?;
    update_task(state.tasks.as_ref(), task_id, me.user_id, payload.into()).await?;
    Ok(Json(TaskMessage {
        message: "Task updated successfully",
    }))
}

#[instrument(skip(state, me), fields(user_id = me.user_id))]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TaskMessage>, AppError> {
    let task_id = parse_task_id(&id)?;
    delete_task(state.tasks.as_ref(), task_id, me.user_id).await?;
    Ok(Json(TaskMessage {
        message: "Task deleted successfully!",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::repo_types::TaskStatus;

    #[test]
    fn task_id_must_be_numeric() {
        assert_eq!(parse_task_id("17").unwrap(), 17);
        assert!(matches!(parse_task_id("abc"), Err(AppError::Validation(_))));
        assert!(parse_task_id("").is_err());
    }

    #[test]
    fn task_item_serialization() {
        let item = TaskItem {
            id: 1,
            title: "buy milk".into(),
            content: None,
            status: TaskStatus::InProgress,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "title": "buy milk",
                "content": null,
                "status": "in_progress",
            })
        );
    }
}
