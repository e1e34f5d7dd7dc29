//! Login gate: one configured username/password pair.
//!
//! This is not a user store. [`Credentials`] holds the single configured pair
//! and [`AuthState`] tracks whether the current session has passed the gate.

use crate::error::DocQaError;
use std::fmt;
use tracing::{info, warn};

/// The configured username/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `true` when both values match exactly.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        // Evaluate both comparisons so timing does not reveal which one failed.
        let user_ok = constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let pass_ok = constant_time_eq(self.password.as_bytes(), password.as_bytes());
        user_ok & pass_ok
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Login state of one session.
#[derive(Debug, Clone)]
pub struct AuthState {
    credentials: Option<Credentials>,
    required: bool,
    user: Option<String>,
}

impl AuthState {
    /// Gate with the given credentials.
    ///
    /// With credentials configured, login is always required. Without them,
    /// `required = true` makes every login fail with
    /// [`DocQaError::AuthNotConfigured`]; `required = false` leaves the
    /// session open.
    pub fn new(credentials: Option<Credentials>, required: bool) -> Self {
        let required = required || credentials.is_some();
        Self {
            credentials,
            required,
            user: None,
        }
    }

    /// An ungated session.
    pub fn open() -> Self {
        Self::new(None, false)
    }

    pub fn requires_login(&self) -> bool {
        self.required
    }

    pub fn is_authenticated(&self) -> bool {
        !self.required || self.user.is_some()
    }

    /// Name of the logged-in user, if any.
    pub fn username(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Check `username`/`password` against the configured credentials.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), DocQaError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(DocQaError::AuthNotConfigured)?;
        if creds.verify(username, password) {
            info!("User '{}' logged in", username);
            self.user = Some(username.to_string());
            Ok(())
        } else {
            warn!("Rejected login attempt for '{}'", username);
            Err(DocQaError::InvalidCredentials)
        }
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("User '{}' logged out", user);
        }
    }

    /// `Ok(())` when the session may proceed.
    pub fn ensure_authenticated(&self) -> Result<(), DocQaError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(DocQaError::NotAuthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthState {
        AuthState::new(Some(Credentials::new("admin", "pw")), false)
    }

    #[test]
    fn verify_requires_exact_match() {
        let c = Credentials::new("admin", "pw");
        assert!(c.verify("admin", "pw"));
        assert!(!c.verify("admin", "pw "));
        assert!(!c.verify("Admin", "pw"));
        assert!(!c.verify("", ""));
    }

    #[test]
    fn wrong_password_never_authenticates() {
        let mut a = gate();
        assert!(matches!(
            a.login("admin", "nope"),
            Err(DocQaError::InvalidCredentials)
        ));
        assert!(!a.is_authenticated());
        assert!(a.ensure_authenticated().is_err());
    }

    #[test]
    fn login_then_logout() {
        let mut a = gate();
        a.login("admin", "pw").unwrap();
        assert!(a.is_authenticated());
        assert_eq!(a.username(), Some("admin"));
        a.logout();
        assert!(!a.is_authenticated());
        assert_eq!(a.username(), None);
    }

    #[test]
    fn required_without_credentials_reports_missing_config() {
        let mut a = AuthState::new(None, true);
        assert!(a.requires_login());
        assert!(matches!(
            a.login("x", "y"),
            Err(DocQaError::AuthNotConfigured)
        ));
    }

    #[test]
    fn open_session_is_authenticated() {
        let a = AuthState::open();
        assert!(!a.requires_login());
        assert!(a.is_authenticated());
    }

    #[test]
    fn debug_hides_password() {
        let dbg = format!("{:?}", Credentials::new("u", "topsecret"));
        assert!(!dbg.contains("topsecret"));
    }
}
