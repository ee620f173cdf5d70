use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Persisted-storage key holding the API credential.
pub const TOKEN_KEY: &str = "token";

/// Persisted-storage key holding the signed-in username.
pub const USERNAME_KEY: &str = "username";

/// An authenticated identity plus the opaque token the API issued for it.
///
/// Both fields are always non-empty; a half-populated session cannot be built.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    identity: String,
    credential: String,
}

impl Session {
    pub fn new(identity: impl Into<String>, credential: impl Into<String>) -> Result<Self, CoreError> {
        let identity = identity.into();
        let credential = credential.into();
        if identity.trim().is_empty() {
            return Err(CoreError::Validation("Session identity must not be empty".into()));
        }
        if credential.trim().is_empty() {
            return Err(CoreError::Validation("Session credential must not be empty".into()));
        }
        Ok(Self { identity, credential })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }
}

// Never print the token.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Values entered on the login form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Required-field checks performed before the login request is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.username.trim().is_empty() {
            return Err(CoreError::Validation("Please enter your username".into()));
        }
        if self.password.is_empty() {
            return Err(CoreError::Validation("Please enter your password".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}
