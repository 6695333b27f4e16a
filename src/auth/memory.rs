//! In-memory `UserStore` for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    auth::{repo::UserStore, repo_types::User},
    error::StoreError,
};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<i64, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let id = users.len() as i64 + 1;
        users.push(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.map(str::to_string),
        });
        Ok(id)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn email_uniqueness_is_case_sensitive() {
        let store = InMemoryUserStore::default();
        let a = store.create_user("Bob@x.com", "h", None).await.unwrap();
        let b = store.create_user("bob@x.com", "h", Some("Bob")).await.unwrap();
        assert_ne!(a, b);
        assert!(matches!(
            store.create_user("bob@x.com", "h", None).await,
            Err(StoreError::DuplicateEmail)
        ));
        assert_eq!(store.get_user_by_id(b).await.unwrap().name.as_deref(), Some("Bob"));
        assert!(matches!(
            store.get_user_by_email("nobody@x.com").await,
            Err(StoreError::NotFound)
        ));
    }
}
