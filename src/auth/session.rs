/// Refresh session lifecycle.
///
/// Each user has at most one live refresh token, stored verbatim on the
/// user row. Signup and login overwrite it (the previous token dies even if
/// unexpired); refresh requires BOTH an exact stored match and an
/// independent signature check; logout clears it and is idempotent.
///
/// Concurrent logins for one user race at the store: the last UPDATE wins
/// and the loser's token is invalid from that point on. Accepted behavior,
/// not a bug.
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::jwt::{issue_access_token, issue_refresh_token, verify_refresh_token};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::users;

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a fresh token pair and persist the refresh token on the user row.
/// Used by both signup and login.
pub async fn establish_session(
    pool: &PgPool,
    user_id: Uuid,
    jwt: &JwtSettings,
) -> Result<TokenPair, AppError> {
    let access_token = issue_access_token(user_id, jwt)?;
    let refresh_token = issue_refresh_token(user_id, jwt)?;

    sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
        .bind(&refresh_token)
        .bind(user_id)
        .execute(pool)
        .await?;

    tracing::debug!(user_id = %user_id, "Refresh session established");

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchange a refresh token for a new access token.
///
/// Two independent gates: the presented string must exactly equal a stored
/// refresh token, AND its signature/expiry must verify against the refresh
/// secret. A row match with a bad signature is rejected — that covers a
/// tampered value that somehow reached the store.
///
/// The refresh token itself is not rotated here; only signup/login replace
/// it and only logout clears it.
pub async fn refresh_access_token(
    pool: &PgPool,
    presented: &str,
    jwt: &JwtSettings,
) -> Result<String, AppError> {
    let user = users::find_by_refresh_token(pool, presented)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidRefreshToken))?;

    if verify_refresh_token(presented, jwt).is_err() {
        tracing::warn!(
            user_id = %user.id,
            "Stored refresh token failed signature verification"
        );
        return Err(AppError::Auth(AuthError::InvalidRefreshToken));
    }

    issue_access_token(user.id, jwt)
}

/// Clear whichever user row stores the presented refresh token.
///
/// An unknown token still reports success: logout is idempotent and the
/// response must not reveal whether the token was live.
pub async fn revoke_session(pool: &PgPool, presented: &str) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE users SET refresh_token = NULL WHERE refresh_token = $1")
        .bind(presented)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        tracing::debug!("Logout with unknown refresh token; nothing cleared");
    }

    Ok(())
}
