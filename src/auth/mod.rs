use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
#[cfg(test)]
pub mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

/// Registration and login. No token required.
pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Profile routes; mount behind `extractors::require_auth`.
pub fn protected_router() -> Router<AppState> {
    handlers::me_routes()
}
