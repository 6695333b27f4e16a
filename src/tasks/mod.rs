use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod services;

/// Task CRUD; mount behind `auth::extractors::require_auth`.
pub fn router() -> Router<AppState> {
    handlers::task_routes()
}
