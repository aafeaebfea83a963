//! Process-wide bearer token holder.
//!
//! Every remote call reads the token from here at send time, so a login or
//! logout anywhere in the host application is visible to in-flight stores
//! without re-wiring. Loss of the token fails calls with
//! [`ApiError::AuthRequired`] instead of retrying silently.

use std::sync::{Arc, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Shared holder for the session's bearer token.
///
/// Cheap to clone; all clones observe the same token.
#[derive(Clone, Default)]
pub struct CredentialStore {
    token: Arc<RwLock<Option<SecretString>>>,
}

impl CredentialStore {
    /// Create an empty holder (no session yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the session token after login.
    pub fn set_token(&self, token: SecretString) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drop the token on logout or session expiry.
    pub fn clear(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a token is currently installed.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The `Authorization` header value for the current token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthRequired`] when no token is installed.
    pub fn bearer(&self) -> Result<String, ApiError> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
            .ok_or(ApiError::AuthRequired)
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
