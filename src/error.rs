/// Unified error handling for the to-do backend.
///
/// Domain-specific error enums convert into a single `AppError`, which maps
/// onto structured JSON HTTP responses. Credential and token failures are
/// deliberately coarse on the wire: the response never distinguishes
/// "unknown email" from "wrong password", and token errors never carry
/// internal detail.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for signup input, surfaced with field-level messages.
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    MissingCharacter(&'static str, &'static str),
    SuspiciousContent(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::MissingCharacter(field, what) => {
                write!(f, "{} must contain at least one {}", field, what)
            }
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Authentication and token lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; the response is identical for both.
    InvalidCredentials,
    /// No Authorization header on a protected route.
    MissingToken,
    /// Authorization header present but not `Bearer <token>`.
    MalformedToken,
    TokenExpired,
    TokenInvalid,
    MissingRefreshToken,
    InvalidRefreshToken,
    RateLimited,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "No token provided"),
            AuthError::MalformedToken => write!(f, "Invalid token format"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::MissingRefreshToken => write!(f, "Refresh token required"),
            AuthError::InvalidRefreshToken => write!(f, "Invalid refresh token"),
            AuthError::RateLimited => write!(f, "Too many attempts. Please try again later."),
        }
    }
}

impl StdError for AuthError {}

/// Store failures. Nothing here is retried; the error propagates to the
/// caller and surfaces as a server error unless it maps to a client fault.
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Central error type the whole application maps to.
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    Database(DatabaseError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AppError::Database(DatabaseError::UniqueConstraintViolation(
                "User already exists".to_string(),
            ))
        } else if error_msg.contains("no rows") {
            AppError::Database(DatabaseError::NotFound("Record not found".to_string()))
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            AppError::Database(DatabaseError::ConnectionPool(error_msg))
        } else {
            AppError::Database(DatabaseError::UnexpectedError(error_msg))
        }
    }
}

/// Error body sent to clients.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating logs with a client report.
    pub error_id: String,
    pub message: String,
    /// Stable code for client-side handling.
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    fn response_parts(&self, error_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = match self {
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR".to_string(),
                e.to_string(),
            ),

            AppError::Auth(e) => {
                let (status, code) = match e {
                    AuthError::InvalidCredentials => {
                        (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                    }
                    AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
                    AuthError::MalformedToken => (StatusCode::UNAUTHORIZED, "MALFORMED_TOKEN"),
                    AuthError::TokenExpired | AuthError::TokenInvalid => {
                        (StatusCode::UNAUTHORIZED, "TOKEN_INVALID")
                    }
                    AuthError::MissingRefreshToken | AuthError::InvalidRefreshToken => {
                        (StatusCode::UNAUTHORIZED, "REFRESH_TOKEN_INVALID")
                    }
                    AuthError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
                };
                // Expired and invalid tokens get one message on the wire.
                let message = match e {
                    AuthError::TokenExpired | AuthError::TokenInvalid => {
                        "Invalid or expired token".to_string()
                    }
                    other => other.to_string(),
                };
                (status, code.to_string(), message)
            }

            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(msg) => (
                    StatusCode::BAD_REQUEST,
                    "USER_EXISTS".to_string(),
                    msg.clone(),
                ),
                DatabaseError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND".to_string(), msg.clone())
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR".to_string(),
                    "Internal server error".to_string(),
                ),
            },

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR".to_string(),
                "Internal server error".to_string(),
            ),
        };

        let body = ErrorResponse::new(error_id.to_string(), message, code, status.as_u16());
        (status, body)
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication error");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(error_id = error_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(e) => {
                tracing::error!(error_id = error_id, error = %e, "Database error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let (status, body) = self.response_parts(&error_id);
        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => StatusCode::BAD_REQUEST,
                DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
