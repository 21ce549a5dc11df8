// API client: the profile, resume and headline operations. Every call goes
// through the session manager, so each one is authenticated and gets the
// retry-once-after-401 treatment for free.

use std::fs;
use std::path::Path;

use reqwest::blocking::multipart;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::Config;
use crate::credentials::Credentials;
use crate::endpoints::{upload_form, FILE_UPLOAD, FULL_PROFILE_UPDATE, PROFILE, RESUME_UPDATE};
use crate::error::{Error, Result};
use crate::session::SessionManager;

/// Holds the session plus the URLs the operations talk to.
pub struct ApiClient {
    session: SessionManager,
    base_url: String,
    upload_url: String,
}

/// Shape of the profile endpoint response. Only the first entry is used.
#[derive(Deserialize, Debug)]
pub struct ProfileResponse {
    #[serde(default)]
    pub profile: Vec<Profile>,
}

/// One profile record. Fields beyond the two used here are kept in `extra`
/// untouched.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, deserialize_with = "string_or_number")]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub resume_headline: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn require_id(&self) -> Result<&str> {
        non_empty(&self.profile_id).ok_or(Error::MissingProfileField("profileId"))
    }

    pub fn require_headline(&self) -> Result<&str> {
        non_empty(&self.resume_headline).ok_or(Error::MissingProfileField("resumeHeadline"))
    }
}

// Profile ids have been seen both quoted and bare.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    })
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

impl ApiClient {
    /// Build a client and its session from configuration.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self> {
        let session = SessionManager::new(config, credentials)?;
        Ok(Self::with_session(session, config))
    }

    pub fn with_session(session: SessionManager, config: &Config) -> Self {
        ApiClient {
            session,
            base_url: config.base_url.clone(),
            upload_url: config.upload_url.clone(),
        }
    }

    pub fn session_mut(&mut self) -> &mut SessionManager {
        &mut self.session
    }

    /// Fetch the logged-in user's profile. Any failure is logged and yields
    /// `None`.
    pub fn fetch_profile(&mut self) -> Option<Profile> {
        let url = PROFILE.url(&self.base_url);
        let response = match self.session.execute(|client| PROFILE.apply(client.get(&url))) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "exception while fetching profile");
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, "failed to fetch profile");
            return None;
        }

        match response.json::<ProfileResponse>() {
            Ok(body) => {
                let profile = body.profile.into_iter().next();
                if profile.is_none() {
                    warn!("no profile data found");
                }
                profile
            }
            Err(e) => {
                warn!(error = %e, "profile response is not readable");
                None
            }
        }
    }

    /// Upload a resume file, then attach it to the active profile.
    pub fn upload_resume(&mut self, file_path: &Path) -> Result<()> {
        if !file_path.exists() {
            return Err(Error::FileNotFound(file_path.to_path_buf()));
        }
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("resume")
            .to_string();
        let bytes = fs::read(file_path)?;

        info!(path = %file_path.display(), size = bytes.len(), "uploading file");
        let upload_url = self.upload_url.clone();
        let response = self.session.execute(|client| {
            let part = multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
            let form = multipart::Form::new()
                .text("formKey", upload_form::FORM_KEY)
                .text("fileName", file_name.clone())
                .text("uploadCallback", upload_form::UPLOAD_CALLBACK)
                .part(upload_form::FILE_FIELD, part);
            FILE_UPLOAD.apply(client.post(&upload_url)).multipart(form)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status,
                operation: "file upload",
            });
        }
        let body: Value = response
            .json()
            .map_err(|e| Error::UnexpectedResponse(format!("upload response is not JSON: {e}")))?;
        let file_key = extract_file_key(&body)?;
        info!(%file_key, "upload successful");

        let profile = self.fetch_profile().ok_or(Error::ProfileUnavailable)?;
        let profile_id = profile.require_id()?;
        self.update_resume(&file_key, profile_id)
    }

    /// Attach an uploaded file to the profile. Only HTTP 200 counts as
    /// success.
    pub fn update_resume(&mut self, file_key: &str, profile_id: &str) -> Result<()> {
        let url = RESUME_UPDATE.profile_url(&self.base_url, profile_id);
        let payload = json!({
            "textCV": {
                "formKey": upload_form::FORM_KEY,
                "fileKey": file_key,
                "textCvContent": null
            }
        });

        info!(%profile_id, "updating resume");
        let response = self
            .session
            .execute(|client| RESUME_UPDATE.apply(client.post(&url)).json(&payload))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Http {
                status,
                operation: "resume update",
            });
        }
        info!("resume updated");
        Ok(())
    }

    /// Bump the profile's "last updated" time by adding a trailing period to
    /// the headline and then restoring the original text. Stops at the first
    /// failed submission.
    pub fn refresh_headline(&mut self) -> Result<()> {
        let profile = self.fetch_profile().ok_or(Error::ProfileUnavailable)?;
        let profile_id = profile.require_id()?;
        let current = profile.require_headline()?;
        info!(headline = %current, "current headline");

        let marked = with_trailing_period(current);
        info!("adding trailing period");
        self.submit_headline(profile_id, &marked)?;

        info!("reverting headline");
        self.submit_headline(profile_id, current)?;
        Ok(())
    }

    fn submit_headline(&mut self, profile_id: &str, headline: &str) -> Result<()> {
        let url = FULL_PROFILE_UPDATE.url(&self.base_url);
        let payload = json!({
            "profile": { "resumeHeadline": headline },
            "profileId": profile_id
        });

        let response = self
            .session
            .execute(|client| FULL_PROFILE_UPDATE.apply(client.post(&url)).json(&payload))?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Http {
                status,
                operation: "headline update",
            });
        }
        Ok(())
    }
}

/// The upload endpoint answers `{"<fileKey>": {...}}`. Anything other than a
/// single-key object is rejected.
pub fn extract_file_key(body: &Value) -> Result<String> {
    let map = body
        .as_object()
        .ok_or_else(|| Error::UnexpectedResponse("upload response is not a JSON object".into()))?;
    let mut keys = map.keys();
    match (keys.next(), keys.next()) {
        (Some(key), None) => Ok(key.clone()),
        (None, _) => Err(Error::UnexpectedResponse("upload response is empty".into())),
        (Some(_), Some(_)) => Err(Error::UnexpectedResponse(format!(
            "upload response has {} keys, expected a single file key",
            map.len()
        ))),
    }
}

/// `"Senior Engineer"` becomes `"Senior Engineer."`. Existing trailing
/// periods collapse into one.
pub fn with_trailing_period(headline: &str) -> String {
    format!("{}.", headline.trim_end_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_key_from_single_key_object() {
        let body = json!({"UR54EQmIiGvBMt": {"url": "//filevalidation.naukri.com/file/download"}});
        assert_eq!(extract_file_key(&body).unwrap(), "UR54EQmIiGvBMt");
    }

    #[test]
    fn file_key_rejects_empty_object() {
        assert!(matches!(
            extract_file_key(&json!({})),
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn file_key_rejects_non_object() {
        assert!(extract_file_key(&json!(["UR54EQmIiGvBMt"])).is_err());
        assert!(extract_file_key(&json!("UR54EQmIiGvBMt")).is_err());
    }

    #[test]
    fn file_key_rejects_multiple_keys() {
        let err = extract_file_key(&json!({"a": {}, "b": {}})).unwrap_err();
        assert!(err.to_string().contains("2 keys"));
    }

    #[test]
    fn trailing_period_is_added_once() {
        assert_eq!(with_trailing_period("Senior Engineer"), "Senior Engineer.");
        assert_eq!(with_trailing_period("Senior Engineer."), "Senior Engineer.");
        assert_eq!(with_trailing_period("Senior Engineer.."), "Senior Engineer.");
    }

    #[test]
    fn profile_fields_must_be_present_and_non_empty() {
        let profile: Profile =
            serde_json::from_value(json!({"profileId": "", "resumeHeadline": null, "name": "x"}))
                .unwrap();
        assert!(matches!(
            profile.require_id(),
            Err(Error::MissingProfileField("profileId"))
        ));
        assert!(matches!(
            profile.require_headline(),
            Err(Error::MissingProfileField("resumeHeadline"))
        ));
        assert_eq!(profile.extra["name"], "x");
    }

    #[test]
    fn numeric_profile_id_is_accepted() {
        let profile: Profile = serde_json::from_value(json!({"profileId": 12345})).unwrap();
        assert_eq!(profile.require_id().unwrap(), "12345");
    }
}
