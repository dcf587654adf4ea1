//! Session service
//!
//! Registration, login and logout against the credential procedures.
//! The authenticated identity lives in a [`Session`] value owned by the
//! service, so each service instance tracks exactly one operator.

use auth::{CredentialVerifier, HmacSha256Verifier};
use db::CallGateway;
use error::{AppError, AuthError, Result};

use crate::schema::{self, columns, LoginUser, RegisterUser};

/// Text shown when nobody is logged in.
pub const NO_IDENTITY: &str = "No user is currently logged in.";

/// Who, if anyone, is authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current_identity: Option<String>,
}

impl Session {
    /// A session with nobody logged in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&str> {
        self.current_identity.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_identity.is_some()
    }
}

/// Session service for credential operations
pub struct SessionService<G, V = HmacSha256Verifier> {
    gateway: G,
    verifier: V,
    session: Session,
}

impl<G: CallGateway> SessionService<G> {
    /// Create a service hashing credentials with an unpeppered HMAC-SHA256.
    pub fn new(gateway: G) -> Self {
        Self::with_verifier(gateway, HmacSha256Verifier::new())
    }
}

impl<G: CallGateway, V: CredentialVerifier> SessionService<G, V> {
    pub fn with_verifier(gateway: G, verifier: V) -> Self {
        Self {
            gateway,
            verifier,
            session: Session::anonymous(),
        }
    }

    /// Store a new credential. The session is not touched.
    ///
    /// Surrounding whitespace in `username` is ignored.
    pub async fn register(&self, username: &str, secret: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username cannot be empty.".to_string()));
        }

        let password_hash = self.verifier.hash(secret)?;
        let call = RegisterUser {
            username,
            password_hash: &password_hash,
        };

        match schema::effect(&self.gateway, &call).await {
            Ok(_) => {
                tracing::info!("User {} registered.", username);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Database error during registration of {}: {}", username, e);
                Err(e.into())
            }
        }
    }

    /// Check a credential and, on success, make `username` the current identity.
    ///
    /// Any identity already logged in is replaced. On failure the session is
    /// left as it was.
    pub async fn login(&mut self, username: &str, secret: &str) -> Result<()> {
        let username = username.trim();
        let rows = schema::query(&self.gateway, &LoginUser { username })
            .await
            .inspect_err(|e| {
                tracing::error!("Database error during login of {}: {}", username, e)
            })?;

        let Some(row) = rows.first() else {
            tracing::warn!("Login failed for {}: unknown user.", username);
            return Err(AuthError::InvalidCredentials.into());
        };

        let stored = row.get_str(columns::PASSWORD_HASH).inspect_err(|e| {
            tracing::error!("Login row for {} has no usable password hash: {}", username, e)
        })?;
        let verified = self.verifier.verify(secret, stored).inspect_err(|e| {
            tracing::error!("Stored credential for {} is unusable: {}", username, e)
        })?;

        if !verified {
            tracing::warn!("Login failed for {}: wrong password.", username);
            return Err(AuthError::InvalidCredentials.into());
        }

        self.session.current_identity = Some(username.to_string());
        tracing::info!("User {} logged in.", username);
        Ok(())
    }

    /// Clear the current identity, returning who was logged out.
    pub fn logout(&mut self) -> Option<String> {
        let previous = self.session.current_identity.take();
        match &previous {
            Some(username) => tracing::info!("User {} has logged out.", username),
            None => tracing::info!("Logout requested with no user logged in."),
        }
        previous
    }

    pub fn current_identity(&self) -> Option<&str> {
        self.session.identity()
    }

    /// The current identity, or [`NO_IDENTITY`].
    pub fn current_identity_display(&self) -> &str {
        self.current_identity().unwrap_or(NO_IDENTITY)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
