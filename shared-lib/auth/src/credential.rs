//! Salted HMAC-SHA256 credential hashing.

use error::AuthError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const SCHEME: &str = "hmac-sha256";

/// Turns secrets into storable hashes and checks secrets against them.
pub trait CredentialVerifier: Send + Sync {
    /// Hash a secret with a fresh salt.
    fn hash(&self, secret: &str) -> Result<String, AuthError>;

    /// Check a secret against a value previously produced by `hash`.
    fn verify(&self, secret: &str, stored: &str) -> Result<bool, AuthError>;
}

/// Verifier storing `hmac-sha256$<salt hex>$<mac hex>`.
///
/// The MAC key is the per-credential salt followed by an optional
/// process-wide pepper.
#[derive(Debug, Clone, Default)]
pub struct HmacSha256Verifier {
    pepper: Vec<u8>,
}

impl HmacSha256Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mix a pepper into every key.
    pub fn with_pepper(pepper: impl Into<Vec<u8>>) -> Self {
        Self {
            pepper: pepper.into(),
        }
    }

    fn mac(&self, salt: &[u8], secret: &str) -> Result<HmacSha256, AuthError> {
        let key = [salt, self.pepper.as_slice()].concat();
        let mut mac = HmacSha256::new_from_slice(&key).map_err(|e| {
            tracing::error!("Failed to create HMAC key: {}", e);
            AuthError::HashingFailed(e.to_string())
        })?;
        mac.update(secret.as_bytes());
        Ok(mac)
    }
}

impl CredentialVerifier for HmacSha256Verifier {
    fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = Uuid::new_v4().into_bytes();
        let digest = self.mac(&salt, secret)?.finalize().into_bytes();
        Ok(format!(
            "{}${}${}",
            SCHEME,
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    fn verify(&self, secret: &str, stored: &str) -> Result<bool, AuthError> {
        let mut parts = stored.split('$');
        let (Some(scheme), Some(salt), Some(digest), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::MalformedHash);
        };
        if scheme != SCHEME {
            return Err(AuthError::MalformedHash);
        }

        let salt = hex::decode(salt).map_err(|_| AuthError::MalformedHash)?;
        let digest = hex::decode(digest).map_err(|_| AuthError::MalformedHash)?;

        // verify_slice compares in constant time
        Ok(self.mac(&salt, secret)?.verify_slice(&digest).is_ok())
    }
}
