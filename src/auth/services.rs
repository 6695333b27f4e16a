use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        repo_types::User,
    },
    error::{AppError, StoreError},
    state::AppState,
};

/// Creates an account and returns its id. The email is stored exactly as given.
pub async fn register_user(state: &AppState, req: RegisterRequest) -> Result<i64, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let hash = state.hasher.hash_blocking(req.password).await?;
    let name = req.name.as_deref().filter(|n| !n.trim().is_empty());

    match state.users.create_user(&req.email, &hash, name).await {
        Ok(id) => {
            info!(user_id = id, "user registered");
            Ok(id)
        }
        Err(StoreError::DuplicateEmail) => {
            warn!(email = %req.email, "email already registered");
            Err(AppError::DuplicateEmail)
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks credentials and issues a token.
///
/// Unknown email and wrong password produce the same `InvalidCredentials`.
pub async fn login_user(state: &AppState, req: LoginRequest) -> Result<String, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let user = match state.users.get_user_by_email(&req.email).await {
        Ok(u) => u,
        Err(StoreError::NotFound) => {
            // Unknown emails cost one Argon2 verify, same as a wrong password.
            state.hasher.verify_unknown_blocking(req.password).await;
            warn!("login unknown email");
            return Err(AppError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    };

    let ok = state
        .hasher
        .verify_blocking(req.password, user.password_hash.clone())
        .await?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.keys.issue(user.id, &user.email)?;
    info!(user_id = user.id, "user logged in");
    Ok(token)
}

pub async fn load_profile(state: &AppState, user_id: i64) -> Result<User, AppError> {
    state.users.get_user_by_id(user_id).await.map_err(|e| match e {
        StoreError::NotFound => AppError::NotFound("User"),
        other => other.into(),
    })
}
