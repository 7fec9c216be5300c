//! Email address normalization and syntax checks.
//!
//! Credentials are keyed by the normalized form, so every lookup and insert
//! must go through [`normalize_email`] first.

use validator::ValidateEmail;

/// Upper bound from RFC 5321 (forward-path limit minus the angle brackets).
pub const EMAIL_MAX_LEN: usize = 254;

/// Trim surrounding whitespace and lowercase the whole address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Syntax check applied to an already-normalized address.
///
/// HTML5-style address grammar via `validator`, plus a dotted domain: single-label
/// hosts such as `localhost` cannot receive mail from us. Deliverability is not
/// checked here.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX_LEN || !email.validate_email() {
        return false;
    }
    email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'))
}
