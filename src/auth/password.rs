/// Password Hashing and Verification
///
/// Handles password hashing with bcrypt. bcrypt only reads the first 72 bytes of its
/// input, so longer plaintexts are rejected instead of being silently truncated.

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

/// Work factor for new hashes
pub const HASH_COST: u32 = 10;

/// Largest plaintext bcrypt consumes without truncation
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt
///
/// # Errors
/// Returns error if:
/// - Password is longer than 72 bytes
/// - Bcrypt hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(ValidationError::InputTooLong(
            MAX_PASSWORD_BYTES,
        )));
    }

    hash(password, HASH_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// Returns `false` for a mismatch, a malformed or foreign hash, and for plaintexts
/// too long to have been hashed by `hash_password`. bcrypt's own comparison is
/// constant time.
pub fn verify_password(password: &str, hash: &str) -> bool {
    if password.len() > MAX_PASSWORD_BYTES {
        return false;
    }

    match verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::debug!(error = %e, "Stored credential hash could not be parsed");
            false
        }
    }
}
