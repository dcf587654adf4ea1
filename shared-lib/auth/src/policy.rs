//! Password policy applied at registration.

use error::AuthError;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Check a new password: at least eight characters, one upper-case letter
/// and one digit.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::WeakPassword(
            "must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "must contain at least one number".to_string(),
        ));
    }
    Ok(())
}
