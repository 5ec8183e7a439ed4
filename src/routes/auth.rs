/// Authentication endpoints: signup, login, token refresh, and logout.
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{establish_session, refresh_access_token, revoke_session, verify_password};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, DatabaseError};
use crate::users::{self, NewUser};
use crate::validators::{validate_email, validate_name, validate_password};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The token field is optional so that a missing value maps to the auth
/// taxonomy (401) instead of a generic deserialization failure.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub msg: String,
}

/// POST /api/auth/signup
///
/// Register a new user and return an access/refresh token pair.
///
/// # Errors
/// - 400: field-level validation failure, or email already registered
/// - 500: hashing or store failure
pub async fn signup(
    form: web::Json<SignupRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let name = validate_name(&form.name)?;
    let email = validate_email(&form.email)?;
    validate_password(&form.password)?;

    if users::find_by_email(pool.get_ref(), &email).await?.is_some() {
        return Err(DatabaseError::UniqueConstraintViolation(
            "User already exists".to_string(),
        )
        .into());
    }

    let user = NewUser::create(name, email, &form.password)?;
    // A concurrent signup losing this race still surfaces as USER_EXISTS
    // through the unique constraint on email.
    users::insert_user(pool.get_ref(), &user).await?;

    let tokens = establish_session(pool.get_ref(), user.id, jwt_config.get_ref()).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(HttpResponse::Created().json(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/auth/login
///
/// Authenticate with email and password; returns a fresh token pair and
/// overwrites the stored refresh token, invalidating any earlier session.
///
/// # Errors
/// - 401: unknown email or wrong password — the response is identical for
///   both, so the endpoint cannot be used to enumerate accounts
/// - 500: store failure
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    // Normalize only; a malformed email is simply an unknown one here.
    let email = form.email.trim().to_lowercase();

    let user = users::find_by_email(pool.get_ref(), &email)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(&form.password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }

    let tokens = establish_session(pool.get_ref(), user.id, jwt_config.get_ref()).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

/// POST /api/auth/refresh-token
///
/// Exchange a refresh token for a new access token. The refresh token is
/// not rotated on this path; it stays valid until the next login or logout.
///
/// # Errors
/// - 401: missing, unknown, expired, or mis-signed refresh token
pub async fn refresh_token(
    form: web::Json<RefreshRequest>,
    pool: web::Data<PgPool>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let presented = form
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Auth(AuthError::MissingRefreshToken))?;

    let access_token = refresh_access_token(pool.get_ref(), presented, jwt_config.get_ref()).await?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse { access_token }))
}

/// POST /api/auth/logout
///
/// Clear the stored refresh token. Always reports success, whether or not
/// the presented token matched anything — an attacker learns nothing about
/// token validity from this endpoint.
pub async fn logout(
    form: web::Json<LogoutRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    if let Some(token) = form.refresh_token.as_deref().filter(|t| !t.is_empty()) {
        revoke_session(pool.get_ref(), token).await?;
    }

    Ok(HttpResponse::Ok().json(LogoutResponse {
        msg: "Logged out successfully".to_string(),
    }))
}
