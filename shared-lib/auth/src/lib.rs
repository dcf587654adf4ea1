//! Credential hashing and password policy.
//!
//! Secrets never reach the store in clear text: registration stores the
//! output of [`CredentialVerifier::hash`] and login checks a candidate
//! secret against it with [`CredentialVerifier::verify`].

mod credential;
mod policy;

pub use credential::{CredentialVerifier, HmacSha256Verifier};
pub use policy::{validate_password, MIN_PASSWORD_LEN};
