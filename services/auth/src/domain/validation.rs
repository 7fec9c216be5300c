//! Input checks run before any store access.

use atelier_domain::email::{is_valid_email, normalize_email};

use crate::error::AuthServiceError;

/// bcrypt ignores input past 72 bytes.
pub const PASSWORD_MAX_BYTES: usize = 72;
pub const PASSWORD_MIN_BYTES: usize = 8;
pub const NAME_MAX_CHARS: usize = 100;

/// Normalize and validate an email, returning the normalized form.
pub fn validate_email(raw: &str) -> Result<String, AuthServiceError> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(AuthServiceError::InvalidEmail);
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), AuthServiceError> {
    let len = password.len();
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(PASSWORD_MIN_BYTES..=PASSWORD_MAX_BYTES).contains(&len) || !has_letter || !has_digit {
        return Err(AuthServiceError::WeakPassword);
    }
    Ok(())
}

/// Trim names; the last name is optional and collapses to `None` when blank.
pub fn validate_names(
    first_name: &str,
    last_name: Option<&str>,
) -> Result<(String, Option<String>), AuthServiceError> {
    let first = first_name.trim();
    let first_len = first.chars().count();
    if first_len == 0 || first_len > NAME_MAX_CHARS {
        return Err(AuthServiceError::InvalidName);
    }
    let last = last_name.map(str::trim).filter(|s| !s.is_empty());
    if last.is_some_and(|s| s.chars().count() > NAME_MAX_CHARS) {
        return Err(AuthServiceError::InvalidName);
    }
    Ok((first.to_owned(), last.map(str::to_owned)))
}
