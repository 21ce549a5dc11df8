// Error taxonomy shared by every part of the client. Operations return
// `Result<T>`; the binary converts failures into a status line at the
// operation boundary (see `ui`).

use std::path::PathBuf;

use reqwest::StatusCode;

/// Library-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Username or password could not be resolved from flags or environment.
    #[error("missing credentials: pass --user/--password or set NAUKRI_USERNAME and NAUKRI_PASSWORD (a .env file works too)")]
    MissingCredentials,

    /// Login failed: transport error, bad status, or a malformed response.
    #[error("login failed: {0}")]
    Auth(String),

    /// Cookie file or local file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Cookie set could not be serialized.
    #[error("failed to serialize cookies: {0}")]
    CookieFile(#[from] serde_json::Error),

    /// Local upload path does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Upstream answered with an unexpected status.
    #[error("{operation} failed with HTTP {status}")]
    Http {
        status: StatusCode,
        operation: &'static str,
    },

    /// Network-level failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Still unauthorized after the single forced re-login.
    #[error("still unauthorized after re-login")]
    Unauthorized,

    /// Upstream body did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Profile was fetched but lacks a required field.
    #[error("profile response is missing `{0}`")]
    MissingProfileField(&'static str),

    /// Profile could not be fetched at all.
    #[error("could not fetch profile")]
    ProfileUnavailable,
}
