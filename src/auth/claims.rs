/// Token claim set (RFC 7519 subset).
///
/// Both access and refresh tokens carry the same shape; they differ only in
/// lifetime and signing secret.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token ID; makes tokens minted within the same second distinct
    pub jti: String,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_seconds,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Extract the user ID from a verified claim set.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::TokenInvalid))
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= chrono::Utc::now().timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_subject_and_window() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, 900);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp - claims.iat, 900);
        assert!(!claims.is_expired());
    }

    #[test]
    fn zero_ttl_counts_as_expired() {
        let claims = Claims::new(Uuid::new_v4(), 0);
        assert!(claims.is_expired());
    }

    #[test]
    fn user_id_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, 900);
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn invalid_subject_is_rejected() {
        let mut claims = Claims::new(Uuid::new_v4(), 900);
        claims.sub = "not-a-uuid".to_string();
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn same_second_claims_are_distinct() {
        let user_id = Uuid::new_v4();
        let a = Claims::new(user_id, 900);
        let b = Claims::new(user_id, 900);
        assert_ne!(a.jti, b.jti);
    }
}
