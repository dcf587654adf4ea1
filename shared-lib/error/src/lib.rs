//! Common error types for the inventory tracker.
//!
//! This crate provides the error taxonomy shared by the call gateway,
//! the credential verifier and the domain services.

use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Whether the failure came from the backing store rather than the caller.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::Gateway(err) if err.is_store())
    }
}

/// Authentication-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password does not meet the policy: {0}")]
    WeakPassword(String),

    #[error("Stored credential is malformed")]
    MalformedHash,

    #[error("Credential hashing failed: {0}")]
    HashingFailed(String),
}

/// Failures surfaced by the call gateway.
///
/// `Store` covers connectivity, protocol and server-side execution failures
/// reported by the backing store. Everything else that goes wrong during a
/// call is `Unexpected`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Database error: {0}")]
    Store(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Short machine-readable code, used in log fields.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Store(_) => "STORE_ERROR",
            GatewayError::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    /// Whether this is a backing-store failure.
    pub fn is_store(&self) -> bool {
        matches!(self, GatewayError::Store(_))
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_messages() {
        let err = GatewayError::Store("connection refused".to_string());
        assert_eq!(err.to_string(), "Database error: connection refused");
        assert_eq!(err.code(), "STORE_ERROR");
        assert!(err.is_store());

        let err = GatewayError::Unexpected("bad column".to_string());
        assert_eq!(err.code(), "UNEXPECTED_ERROR");
        assert!(!err.is_store());
    }

    #[test]
    fn test_app_error_from_gateway() {
        let err: AppError = GatewayError::Store("down".to_string()).into();
        assert!(matches!(err, AppError::Gateway(GatewayError::Store(_))));
        assert_eq!(err.to_string(), "Gateway error: Database error: down");
    }
}
