use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::PasswordHasher,
        repo::{PgUserStore, UserStore},
    },
    config::AppConfig,
    tasks::repo::{PgTaskStore, TaskStore},
};

/// Everything a request handler may touch. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub keys: JwtKeys,
    pub hasher: PasswordHasher,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn from_pool(db: PgPool, config: AppConfig) -> anyhow::Result<Self> {
        Self::from_parts(
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgTaskStore::new(db)),
            config,
        )
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(&config.jwt);
        let hasher = PasswordHasher::new(&config.password)?;
        Ok(Self {
            users,
            tasks,
            keys,
            hasher,
            config: Arc::new(config),
        })
    }

    /// In-memory stores and cheap hashing, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::{
            auth::memory::InMemoryUserStore,
            config::{DatabaseConfig, JwtConfig, PasswordConfig},
            tasks::memory::InMemoryTaskStore,
        };

        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database: DatabaseConfig {
                url: "postgres://unused".into(),
                max_connections: 1,
                acquire_timeout_secs: 1,
            },
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
            password: PasswordConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
        };

        Self::from_parts(
            Arc::new(InMemoryUserStore::default()),
            Arc::new(InMemoryTaskStore::default()),
            config,
        )
        .expect("fake state")
    }
}
