/// Signup input validators.
///
/// Every check returns a field-level error so the client sees which input
/// was rejected and why. Emails are case-normalized here; the rest of the
/// system only ever sees the lowercase form.
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_NAME_LENGTH: usize = 256;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*";

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates and normalizes an email address.
/// Returns the trimmed, lowercased form that gets stored and looked up.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let normalized = email.trim().to_lowercase();

    if normalized.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if normalized.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if normalized.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(&normalized) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    if normalized.matches('@').count() != 1 || normalized.contains('\0') {
        return Err(ValidationError::SuspiciousContent("email"));
    }

    Ok(normalized)
}

/// Validates a display name. Returns the trimmed form.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name"));
    }

    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name", MAX_NAME_LENGTH));
    }

    if trimmed.contains('\0') || trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("name"));
    }

    Ok(trimmed.to_string())
}

/// Validates password strength.
///
/// Requirements: 8-128 characters, at least one uppercase letter, one
/// digit, and one special character from `!@#$%^&*`. The plaintext is
/// only inspected here and in the hasher; it is never stored or logged.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::MissingCharacter(
            "password",
            "uppercase letter",
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::MissingCharacter("password", "number"));
    }

    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Err(ValidationError::MissingCharacter(
            "password",
            "special character (!@#$%^&*)",
        ));
    }

    Ok(())
}
