/// Password hashing and verification.
///
/// bcrypt with cost factor 10, per-record random salt. The storage path
/// goes through `hash_for_storage`, which refuses to re-hash a value that
/// already carries a bcrypt tag: the idempotence guard that keeps a
/// double-save from corrupting the stored credential.
use crate::error::AppError;

const HASH_COST: u32 = 10;

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Hash a plaintext password. Hashing failure is fatal to the calling
/// operation and surfaces as a server error.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, HASH_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Hash a credential for storage, unless it is already a produced hash.
pub fn hash_for_storage(secret: &str) -> Result<String, AppError> {
    if is_hashed(secret) {
        return Ok(secret.to_string());
    }
    hash_password(secret)
}

/// Verify a plaintext password against a stored hash.
///
/// Never errors: a malformed stored hash simply verifies false. The
/// comparison itself is constant-time inside bcrypt.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}

fn is_hashed(value: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|p| value.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Abcdef1!";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hash = hash_password("Abcdef1!").expect("Failed to hash password");
        assert!(!verify_password("Wrong1!pass", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        // Per-record random salt
        let a = hash_password("Abcdef1!").unwrap();
        let b = hash_password("Abcdef1!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_for_storage_is_idempotent() {
        let first = hash_for_storage("Abcdef1!").unwrap();
        let second = hash_for_storage(&first).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn verify_never_panics_on_garbage_hash() {
        assert!(!verify_password("Abcdef1!", "not-a-bcrypt-hash"));
        assert!(!verify_password("Abcdef1!", ""));
    }
}
