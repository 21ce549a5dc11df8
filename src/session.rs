// Session lifecycle: acquire, persist, validate and renew the login
// cookies that authenticate every other call.
//
// The state starts from whatever the cookie file holds. Every
// authenticated request goes through `SessionManager::execute`, which
// logs in first when needed and retries exactly once after a 401.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderValue, COOKIE};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::cookies::{Cookie, CookieStore};
use crate::credentials::Credentials;
use crate::endpoints::LOGIN;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable cookie file.
    Absent,
    /// Persisted cookies that have not expired yet.
    Valid,
    /// Persisted cookies, at least one past its expiry.
    Expired,
    /// Logged in during this process.
    Authenticated,
}

impl SessionState {
    pub fn needs_login(self) -> bool {
        matches!(self, SessionState::Absent | SessionState::Expired)
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    cookies: Option<Value>,
}

pub struct SessionManager {
    client: Client,
    credentials: Credentials,
    store: CookieStore,
    base_url: String,
    cookie_domain: String,
    cookies: Vec<Cookie>,
    state: SessionState,
}

impl SessionManager {
    /// Build a manager with a fresh HTTP client and load any persisted
    /// session.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config, credentials))
    }

    pub fn with_client(client: Client, config: &Config, credentials: Credentials) -> Self {
        let store = CookieStore::new(&config.cookie_file);
        let cookies = store.load();
        let state = if cookies.is_empty() {
            SessionState::Absent
        } else if store.is_expired() {
            SessionState::Expired
        } else {
            SessionState::Valid
        };
        debug!(?state, cookies = cookies.len(), "session initialised");

        Self {
            client,
            credentials,
            store,
            base_url: config.base_url.clone(),
            cookie_domain: config.cookie_domain.clone(),
            cookies,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn cookie_store(&self) -> &CookieStore {
        &self.store
    }

    /// Log in unless the current session is usable.
    pub fn ensure_valid(&mut self) -> Result<()> {
        if self.state.needs_login() {
            debug!(state = ?self.state, "session not usable");
            self.login()?;
        }
        Ok(())
    }

    /// Post credentials and replace the session with the returned cookies.
    ///
    /// Nothing is written unless the response carries at least one usable
    /// cookie.
    pub fn login(&mut self) -> Result<()> {
        info!(user = %self.credentials.username(), "logging in");

        let payload = LoginRequest {
            username: self.credentials.username(),
            password: self.credentials.password(),
        };
        let response = LOGIN
            .apply(self.client.post(LOGIN.url(&self.base_url)))
            .json(&payload)
            .send()
            .map_err(|e| Error::Auth(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Auth(format!("HTTP {status}")));
        }

        let body: LoginResponse = response
            .json()
            .map_err(|e| Error::Auth(format!("unreadable response: {e}")))?;
        let entries = match body.cookies {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(Error::Auth("`cookies` is not an array".into())),
            None => return Err(Error::Auth("response does not contain cookies".into())),
        };

        let cookies: Vec<Cookie> = entries
            .iter()
            .filter_map(|entry| cookie_from_login(entry, &self.cookie_domain))
            .collect();
        if cookies.is_empty() {
            return Err(Error::Auth("response carried no usable cookies".into()));
        }

        self.store.save(&cookies)?;
        self.cookies = cookies;
        self.state = SessionState::Authenticated;
        info!(cookies = self.cookies.len(), "login successful");
        Ok(())
    }

    /// Drop the session in memory and on disk.
    pub fn logout(&mut self) -> Result<()> {
        self.cookies.clear();
        self.state = SessionState::Absent;
        self.store.clear()?;
        info!("logged out");
        Ok(())
    }

    /// Send an authenticated request.
    ///
    /// `build` is called once per attempt, so it must be able to produce the
    /// same request twice. A 401 forces one login and one retry; a second
    /// 401 is [`Error::Unauthorized`]. Any other status is returned to the
    /// caller as-is.
    pub fn execute<F>(&mut self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        self.ensure_valid()?;

        let response = self.dispatch(build(&self.client))?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!(url = %response.url(), "unauthorized, logging in again");
        self.login()?;

        let response = self.dispatch(build(&self.client))?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "still unauthorized after re-login");
            return Err(Error::Unauthorized);
        }
        Ok(response)
    }

    fn dispatch(&self, builder: RequestBuilder) -> Result<Response> {
        let mut request = builder.build()?;
        if let Some(value) = self.cookie_header(request.url()) {
            request.headers_mut().insert(COOKIE, value);
        }
        debug!(method = %request.method(), url = %request.url(), "sending request");
        let response = self.client.execute(request)?;
        debug!(status = %response.status(), "response received");
        Ok(response)
    }

    fn cookie_header(&self, url: &Url) -> Option<HeaderValue> {
        let host = url.host_str()?;
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|cookie| cookie.matches_host(host))
            .filter_map(|cookie| {
                let pair = format!("{}={}", cookie.name, cookie.value());
                match HeaderValue::from_str(&pair) {
                    Ok(_) => Some(pair),
                    Err(_) => {
                        warn!(name = %cookie.name, "skipping cookie that is not a valid header value");
                        None
                    }
                }
            })
            .collect();
        if pairs.is_empty() {
            return None;
        }
        match HeaderValue::from_str(&pairs.join("; ")) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "could not build cookie header");
                None
            }
        }
    }
}

/// Login cookies carry `name`, `value` and optionally `domain` and an
/// expiry (`expiry` or `expires`, epoch seconds). Entries without a name or
/// value are skipped.
fn cookie_from_login(entry: &Value, default_domain: &str) -> Option<Cookie> {
    let name = entry.get("name")?.as_str()?;
    let value = entry.get("value")?.as_str()?;
    let domain = entry
        .get("domain")
        .and_then(Value::as_str)
        .filter(|domain| !domain.is_empty())
        .unwrap_or(default_domain);
    let expiry = entry
        .get("expiry")
        .or_else(|| entry.get("expires"))
        .and_then(Value::as_i64)
        .filter(|&expiry| expiry > 0);
    Some(Cookie::new(name, value, domain, expiry))
}
