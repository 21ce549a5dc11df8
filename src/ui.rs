// UI layer: runs one requested action and turns its result into a status
// line. This is the boundary where operation errors stop being errors and
// become a success flag plus a message for the user.

use std::path::PathBuf;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::api::ApiClient;
use crate::cookies::CookieStore;

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Upload(PathBuf),
    Refresh,
    Profile,
    /// Only make sure a valid session exists.
    SessionOnly,
}

/// Result of an action as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Outcome {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Outcome {
            success: false,
            message: message.into(),
        }
    }
}

/// Make sure the session is valid, then perform `action`.
pub fn run(api: &mut ApiClient, action: &Action) -> Outcome {
    if let Err(e) = with_spinner("Checking session...", || api.session_mut().ensure_valid()) {
        return Outcome::failed(format!("Login failed: {e}"));
    }

    match action {
        Action::Upload(path) => {
            match with_spinner("Uploading resume...", || api.upload_resume(path)) {
                Ok(()) => Outcome::ok("Upload successful"),
                Err(e) => Outcome::failed(format!("Upload failed: {e}")),
            }
        }
        Action::Refresh => {
            match with_spinner("Refreshing headline...", || api.refresh_headline()) {
                Ok(()) => Outcome::ok("Resume headline refreshed successfully"),
                Err(e) => Outcome::failed(format!("Headline refresh failed: {e}")),
            }
        }
        Action::Profile => match with_spinner("Fetching profile...", || api.fetch_profile()) {
            Some(profile) => Outcome::ok(format!(
                "Profile {}\nHeadline: {}",
                profile.profile_id.as_deref().unwrap_or("<unknown>"),
                profile.resume_headline.as_deref().unwrap_or("<none>"),
            )),
            None => Outcome::failed("Could not fetch profile"),
        },
        Action::SessionOnly => {
            Outcome::ok("Session is valid. No action provided: use --upload or --refresh.")
        }
    }
}

/// Remove the persisted session. Needs no credentials.
pub fn logout(store: &CookieStore) -> Outcome {
    match store.clear() {
        Ok(()) => Outcome::ok("Logged out and cleared cookies"),
        Err(e) => Outcome::failed(format!("Logout failed: {e}")),
    }
}

/// Print the outcome: successes to stdout, failures to stderr.
pub fn report(outcome: &Outcome) {
    if outcome.success {
        println!("{}", outcome.message);
    } else {
        eprintln!("{}", outcome.message);
    }
}

// indicatif hides the spinner automatically when stderr is not a terminal.
fn with_spinner<T>(message: &'static str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    spinner.finish_and_clear();
    result
}
