/// Input validators for account registration and credential updates
/// Features:
/// 1. DoS Protection: Input length limits
/// 2. Email format validation
///
/// Emails are stored exactly as given; validation never rewrites them.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_LOCAL_PART_LENGTH: usize = 64;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address
/// - Rejects empty and over-long input
/// - Checks format using RFC 5322 simplified regex
pub fn is_valid_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email".to_string(), MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    // Overlong local part (before @)
    if let Some(at_pos) = email.find('@') {
        if at_pos > MAX_LOCAL_PART_LENGTH {
            return Err(ValidationError::InvalidFormat("email".to_string()));
        }
    }

    Ok(())
}

/// Passwords must be present; the hasher enforces the upper bound
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }
    Ok(())
}
