// Credential resolution. Explicit values (CLI flags) win over the
// environment; an empty value counts as absent. Resolution happens once at
// startup, before any request is made.

use std::fmt;

use crate::error::{Error, Result};

pub const USERNAME_VAR: &str = "NAUKRI_USERNAME";
pub const PASSWORD_VAR: &str = "NAUKRI_PASSWORD";

/// Username/password pair used for login. Never mutated after resolution.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Build credentials from explicit values. Fails if either is empty.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(Error::MissingCredentials);
        }
        Ok(Self { username, password })
    }

    /// Resolve from explicit values, falling back to `NAUKRI_USERNAME` and
    /// `NAUKRI_PASSWORD`.
    pub fn resolve(explicit_user: Option<String>, explicit_pass: Option<String>) -> Result<Self> {
        Self::resolve_with(explicit_user, explicit_pass, |key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::resolve`] with a caller-supplied lookup in place
    /// of the process environment.
    pub fn resolve_with<F>(
        explicit_user: Option<String>,
        explicit_pass: Option<String>,
        lookup: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = pick(explicit_user, || lookup(USERNAME_VAR));
        let password = pick(explicit_pass, || lookup(PASSWORD_VAR));
        match (username, password) {
            (Some(username), Some(password)) => Ok(Self { username, password }),
            _ => Err(Error::MissingCredentials),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

fn pick(explicit: Option<String>, fallback: impl FnOnce() -> Option<String>) -> Option<String> {
    explicit
        .filter(|v| !v.is_empty())
        .or_else(|| fallback().filter(|v| !v.is_empty()))
}

// Password never shows up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
