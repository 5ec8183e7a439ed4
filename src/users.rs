/// User records and store access.
///
/// Record construction goes through `NewUser::create`, the single path that
/// hashes the password (or detects an already-hashed value) before anything
/// becomes persistable. There is no implicit save hook anywhere else.
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::hash_for_storage;
use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// The single outstanding refresh token; NULL when logged out.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user record ready for insertion. Holds a hash, never a plaintext.
#[derive(Debug)]
pub struct NewUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    /// Build a persistable record from validated signup input.
    /// `name` and `email` are expected pre-validated and normalized.
    pub fn create(name: String, email: String, password: &str) -> Result<Self, AppError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash: hash_for_storage(password)?,
        })
    }
}

pub async fn insert_user(pool: &PgPool, user: &NewUser) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, name, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, refresh_token, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

/// Exact string match against the stored refresh token.
pub async fn find_by_refresh_token(pool: &PgPool, token: &str) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password_hash, refresh_token, created_at
        FROM users
        WHERE refresh_token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}
