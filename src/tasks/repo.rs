use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::StoreError,
    tasks::repo_types::{Task, TaskFields, TaskRow, TaskStatus},
};

/// Owner-scoped task persistence. Every method takes the owner and every
/// statement filters on it, so another user's rows are unreachable.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, owner_id: i64, fields: &TaskFields) -> Result<i64, StoreError>;

    /// All tasks of `owner_id` in insertion order.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, StoreError>;

    /// Current status of `(task_id, owner_id)`, `None` when no such row.
    async fn status_of(&self, task_id: i64, owner_id: i64)
        -> Result<Option<TaskStatus>, StoreError>;

    /// Returns the number of rows touched (0 or 1).
    async fn update(
        &self,
        task_id: i64,
        owner_id: i64,
        fields: &TaskFields,
    ) -> Result<u64, StoreError>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete(&self, task_id: i64, owner_id: i64) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct PgTaskStore {
    db: PgPool,
}

impl PgTaskStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn decode_row(row: TaskRow) -> Result<Task, StoreError> {
    Task::try_from(row).map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, owner_id: i64, fields: &TaskFields) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tasks (owner_id, title, content, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(&fields.title)
        .bind(fields.content.as_deref())
        .bind(fields.status.as_str())
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, owner_id, title, content, status
            FROM tasks
            WHERE owner_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(decode_row).collect()
    }

    async fn status_of(
        &self,
        task_id: i64,
        owner_id: i64,
    ) -> Result<Option<TaskStatus>, StoreError> {
        let status = sqlx::query_scalar::<_, String>(
            r#"SELECT status FROM tasks WHERE id = $1 AND owner_id = $2"#,
        )
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        status
            .map(|s| {
                s.parse::<TaskStatus>()
                    .map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
            })
            .transpose()
    }

    async fn update(
        &self,
        task_id: i64,
        owner_id: i64,
        fields: &TaskFields,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
               SET title = $1, content = $2, status = $3
             WHERE id = $4 AND owner_id = $5
            "#,
        )
        .bind(&fields.title)
        .bind(fields.content.as_deref())
        .bind(fields.status.as_str())
        .bind(task_id)
        .bind(owner_id)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, task_id: i64, owner_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(r#"DELETE FROM tasks WHERE id = $1 AND owner_id = $2"#)
            .bind(task_id)
            .bind(owner_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
