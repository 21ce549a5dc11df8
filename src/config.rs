// Runtime configuration: where the service lives and where the session is
// persisted. Values come from the environment (optionally a `.env` file)
// with defaults pointing at the production site.

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://www.naukri.com";
pub const DEFAULT_UPLOAD_URL: &str = "https://filevalidation.naukri.com/file";
pub const DEFAULT_COOKIE_DOMAIN: &str = ".naukri.com";
const COOKIE_FILE_NAME: &str = ".naukri_cookies.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Main site, without trailing slash.
    pub base_url: String,
    /// File-validation endpoint used for resume uploads.
    pub upload_url: String,
    /// JSON file holding the persisted session cookies.
    pub cookie_file: PathBuf,
    /// Domain assigned to login cookies that arrive without one.
    pub cookie_domain: String,
}

impl Config {
    /// Load configuration from `NAUKRI_BASE_URL`, `NAUKRI_UPLOAD_URL` and
    /// `NAUKRI_COOKIE_FILE`. A `.env` file is read first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Config {
            base_url: std::env::var("NAUKRI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            upload_url: std::env::var("NAUKRI_UPLOAD_URL").unwrap_or(defaults.upload_url),
            cookie_file: std::env::var_os("NAUKRI_COOKIE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cookie_file),
            cookie_domain: defaults.cookie_domain,
        }
    }

    /// Point every endpoint at `base_url`. Used when talking to a local
    /// stand-in for the service.
    pub fn for_base_url(base_url: &str, cookie_file: PathBuf) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Config {
            upload_url: format!("{base_url}/file"),
            base_url,
            cookie_file,
            cookie_domain: DEFAULT_COOKIE_DOMAIN.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            cookie_file: dir.join(COOKIE_FILE_NAME),
            cookie_domain: DEFAULT_COOKIE_DOMAIN.to_string(),
        }
    }
}
