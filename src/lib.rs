// Library root
// -----------
// The binary (`main.rs`) is a thin wrapper around these modules.
//
// Module responsibilities:
// - `credentials`: resolve username/password from flags or environment.
// - `cookies`: session cookie model and its JSON file.
// - `session`: login/logout, session validity and the authenticated
//   request path (retry once after a 401).
// - `endpoints`: fixed paths and header sets of the upstream service.
// - `api`: profile fetch, resume upload/update and headline refresh.
// - `ui`: runs one action and reports the result to the user.
pub mod api;
pub mod config;
pub mod cookies;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod session;
pub mod ui;

pub use api::{ApiClient, Profile};
pub use config::Config;
pub use cookies::{Cookie, CookieStore, FALLBACK_COOKIE_TTL_SECS};
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use session::{SessionManager, SessionState};
