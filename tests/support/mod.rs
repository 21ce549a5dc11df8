//! Shared helpers for tests that talk to a local wiremock server.
//!
//! The client under test is blocking, so the mock server is driven by its
//! own tokio runtime and the test body stays synchronous.

#![allow(dead_code)]

use std::net::TcpListener;
use std::panic::Location;
use std::path::PathBuf;

use naukri_refresh::{ApiClient, Config, Cookie, CookieStore, Credentials, SessionManager};
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const LOGIN_PATH: &str = "/central-login-services/v1/login";
pub const PROFILE_PATH: &str = "/cloudgateway-mynaukri/resman-aggregator-services/v2/users/self";
pub const FULL_PROFILE_PATH: &str =
    "/cloudgateway-mynaukri/resman-aggregator-services/v1/users/self/fullprofiles";
pub const UPLOAD_PATH: &str = "/file";

pub fn resume_update_path(profile_id: &str) -> String {
    format!("/cloudgateway-mynaukri/resman-aggregator-services/v0/users/self/profiles/{profile_id}/advResume")
}

#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var("NAUKRI_REQUIRE_SOCKET_TESTS")
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let location = Location::caller();
    let message = format!(
        "[socket-bound-test] cannot bind localhost socket at {}:{}; wiremock-based test cannot run in this environment",
        location.file(),
        location.line()
    );
    if socket_tests_required() {
        panic!("{message}. Set NAUKRI_REQUIRE_SOCKET_TESTS=0 to allow local skip behavior.");
    }

    eprintln!("{message}. Skipping test. Set NAUKRI_REQUIRE_SOCKET_TESTS=1 to fail-fast instead.");
    true
}

/// A mock upstream plus a scratch directory for the cookie file.
///
/// Field order matters: the server is dropped (and its expectations
/// verified) before the runtime.
pub struct Upstream {
    pub server: MockServer,
    pub runtime: Runtime,
    pub dir: tempfile::TempDir,
}

impl Upstream {
    #[track_caller]
    pub fn start() -> Option<Self> {
        if should_skip_socket_bound_test() {
            return None;
        }
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Some(Upstream {
            server,
            runtime,
            dir: tempfile::TempDir::new().unwrap(),
        })
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn requests_to(&self, request_path: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|request| request.url.path() == request_path)
            .collect()
    }

    pub fn host(&self) -> String {
        self.server.address().ip().to_string()
    }

    pub fn cookie_file(&self) -> PathBuf {
        self.dir.path().join("cookies.json")
    }

    pub fn config(&self) -> Config {
        let mut config = Config::for_base_url(&self.server.uri(), self.cookie_file());
        config.cookie_domain = self.host();
        config
    }

    pub fn store(&self) -> CookieStore {
        CookieStore::new(self.cookie_file())
    }

    /// Persist a session that is still valid for an hour.
    pub fn seed_valid_session(&self, value: &str) {
        let expiry = chrono::Utc::now().timestamp() + 3600;
        self.store()
            .save(&[Cookie::new("nauk_at", value, self.host(), Some(expiry))])
            .unwrap();
    }

    pub fn session(&self) -> SessionManager {
        SessionManager::new(&self.config(), credentials()).unwrap()
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.config(), credentials()).unwrap()
    }

    /// Login answers with one cookie scoped to the mock server's host.
    pub fn mount_login(&self, token: &str, times: u64) {
        self.mount(
            Mock::given(method("POST"))
                .and(path(LOGIN_PATH))
                .respond_with(ResponseTemplate::new(200).set_body_json(login_body(&self.host(), token)))
                .expect(times),
        );
    }

    pub fn mount_profile(&self, profile: Value) {
        self.mount(
            Mock::given(method("GET"))
                .and(path(PROFILE_PATH))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "profile": [profile] }))),
        );
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("jobseeker@example.com", "correct horse").unwrap()
}

pub fn login_body(domain: &str, token: &str) -> Value {
    json!({
        "cookies": [
            { "name": "nauk_at", "value": token, "domain": domain },
            { "name": "nauk_sid", "value": "sid-1", "domain": domain }
        ]
    })
}

pub fn body_json(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|value| value.to_str().ok())
}
