//! In-memory `TaskStore` for tests. Applies the same owner predicate as SQL.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    error::StoreError,
    tasks::{
        repo::TaskStore,
        repo_types::{Task, TaskFields, TaskStatus},
    },
};

#[derive(Default)]
pub struct InMemoryTaskStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: Vec<Task>,
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, owner_id: i64, fields: &TaskFields) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.push(Task {
            id,
            owner_id,
            title: fields.title.clone(),
            content: fields.content.clone(),
            status: fields.status,
        });
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn status_of(
        &self,
        task_id: i64,
        owner_id: i64,
    ) -> Result<Option<TaskStatus>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .iter()
            .find(|t| t.id == task_id && t.owner_id == owner_id)
            .map(|t| t.status))
    }

    async fn update(
        &self,
        task_id: i64,
        owner_id: i64,
        fields: &TaskFields,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .rows
            .iter_mut()
            .find(|t| t.id == task_id && t.owner_id == owner_id)
        {
            Some(task) => {
                task.title = fields.title.clone();
                task.content = fields.content.clone();
                task.status = fields.status;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, task_id: i64, owner_id: i64) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.rows.len();
        inner
            .rows
            .retain(|t| !(t.id == task_id && t.owner_id == owner_id));
        Ok((before - inner.rows.len()) as u64)
    }
}
