use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, ProfileResponse, RegisterRequest},
        extractors::AuthUser,
        services::{load_profile, login_user, register_user},
    },
    error::{ApiJson, AppError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes that must sit behind the session guard.
pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    register_user(&state, payload).await?;
    Ok(Json(MessageResponse {
        message: "User registered successfully!",
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = login_user(&state, payload).await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
    }))
}

#[instrument(skip(state, me), fields(user_id = me.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = load_profile(&state, me.user_id).await?;
    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}
