use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                  // BIGSERIAL
    pub email: String,            // unique, stored as given
    pub password_hash: String,    // Argon2 PHC string, never serialized
    pub name: Option<String>,
}
