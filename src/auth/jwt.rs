/// Token issuance and verification.
///
/// Access and refresh tokens are HS256 JWTs signed with *distinct* secrets
/// from `JwtSettings`; a token signed with one secret never verifies under
/// the other. Issuance is a pure function of (user id, secret, expiry,
/// current time) and touches no state.
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Issue a short-lived access token (default 15 minutes).
pub fn issue_access_token(user_id: Uuid, config: &JwtSettings) -> Result<String, AppError> {
    sign(user_id, &config.access_secret, config.access_token_expiry)
}

/// Issue a long-lived refresh token (default 7 days).
pub fn issue_refresh_token(user_id: Uuid, config: &JwtSettings) -> Result<String, AppError> {
    sign(user_id, &config.refresh_secret, config.refresh_token_expiry)
}

/// Verify an access token and return its claims.
pub fn verify_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    decode_with(token, &config.access_secret)
}

/// Verify a refresh token and return its claims.
pub fn verify_refresh_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    decode_with(token, &config.refresh_secret)
}

fn sign(user_id: Uuid, secret: &str, ttl_seconds: i64) -> Result<String, AppError> {
    let claims = Claims::new(user_id, ttl_seconds);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

fn decode_with(token: &str, secret: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Tokens are rejected at the exact expiry instant, not 60s later.
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Auth(AuthError::TokenExpired)
        }
        _ => AppError::Auth(AuthError::TokenInvalid),
    })?;

    // jsonwebtoken treats exp == now as still valid; we do not.
    if claims.is_expired() {
        return Err(AppError::Auth(AuthError::TokenExpired));
    }

    Ok(claims)
}
