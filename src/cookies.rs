// Session cookie model and the JSON file it is persisted to.
//
// The file is a plain JSON array of `{name, value, domain, expiry}` objects,
// `expiry` in epoch seconds. Anything unreadable is treated as "log in
// again" rather than a hard failure.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Lifetime given to cookies that arrive without an expiry of their own.
pub const FALLBACK_COOKIE_TTL_SECS: i64 = 3600;

/// One session cookie.
///
/// The value is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    value: String,
    #[serde(default)]
    pub domain: String,
    /// Epoch seconds. `None` (or `0` on disk) means unset.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "expiry_or_unset"
    )]
    pub expiry: Option<i64>,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        expiry: Option<i64>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            expiry,
        }
    }

    /// Cookie value. Sensitive, keep it out of logs.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiry.is_some_and(|expiry| expiry < now)
    }

    /// Whether this cookie should be sent to `host`. A leading dot on the
    /// domain is ignored; subdomains match. An empty domain matches any host.
    pub fn matches_host(&self, host: &str) -> bool {
        let domain = self.domain.trim_start_matches('.');
        if domain.is_empty() {
            return true;
        }
        let host = host.to_ascii_lowercase();
        let domain = domain.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    }
}

impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("expiry", &self.expiry)
            .finish()
    }
}

fn expiry_or_unset<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.filter(|&expiry| expiry != 0))
}

/// Current time in epoch seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// File-backed cookie persistence.
///
/// There is no locking: two processes sharing one file may race.
#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the persisted cookies. Missing or unreadable files yield an
    /// empty set.
    pub fn load(&self) -> Vec<Cookie> {
        if !self.exists() {
            debug!(path = %self.path.display(), "no cookie file");
            return Vec::new();
        }
        match self.read() {
            Ok(cookies) => {
                info!(path = %self.path.display(), count = cookies.len(), "loaded cookies");
                cookies
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not load cookies");
                Vec::new()
            }
        }
    }

    /// Overwrite the file with `cookies`. Cookies without an expiry get
    /// `now + FALLBACK_COOKIE_TTL_SECS`.
    pub fn save(&self, cookies: &[Cookie]) -> Result<()> {
        self.save_at(cookies, now())
    }

    pub fn save_at(&self, cookies: &[Cookie], now: i64) -> Result<()> {
        let stamped: Vec<Cookie> = cookies
            .iter()
            .cloned()
            .map(|mut cookie| {
                if cookie.expiry.is_none() {
                    cookie.expiry = Some(now + FALLBACK_COOKIE_TTL_SECS);
                }
                cookie
            })
            .collect();

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        // Write beside the target, then rename over it.
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &stamped)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!(path = %self.path.display(), count = stamped.len(), "cookies saved");
        Ok(())
    }

    /// True when the file is absent, unreadable, empty, or holds any cookie
    /// whose expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        if !self.exists() {
            return true;
        }
        let cookies = match self.read() {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not check cookie expiry");
                return true;
            }
        };
        if cookies.is_empty() {
            return true;
        }
        match cookies.iter().find(|c| c.is_expired_at(now)) {
            Some(cookie) => {
                info!(name = %cookie.name, expiry = ?cookie.expiry, "cookie expired");
                true
            }
            None => false,
        }
    }

    /// Delete the file if present.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "cookie file removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read(&self) -> std::result::Result<Vec<Cookie>, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
