// CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use naukri_refresh::ui::Action;

/// Keep a Naukri profile fresh from the command line.
///
/// Logs in when the saved session is missing or expired, then performs at
/// most one action.
#[derive(Parser, Debug)]
#[command(name = "naukri-refresh")]
#[command(author, version, about)]
#[command(group(ArgGroup::new("action").args(["upload", "refresh", "profile", "logout"])))]
pub struct Args {
    /// Naukri username (overrides NAUKRI_USERNAME)
    #[arg(long)]
    pub user: Option<String>,

    /// Naukri password (overrides NAUKRI_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Path to resume file to upload
    #[arg(long, value_name = "PATH")]
    pub upload: Option<PathBuf>,

    /// Refresh resume headline
    #[arg(long)]
    pub refresh: bool,

    /// Print profile id and current headline
    #[arg(long)]
    pub profile: bool,

    /// Clear the saved session and exit
    #[arg(long)]
    pub logout: bool,

    /// Cookie file location (overrides NAUKRI_COOKIE_FILE)
    #[arg(long, value_name = "PATH")]
    pub cookie_file: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Action to run after the session check. `--logout` is handled
    /// separately since it needs no login.
    pub fn action(&self) -> Action {
        if let Some(path) = &self.upload {
            Action::Upload(path.clone())
        } else if self.refresh {
            Action::Refresh
        } else if self.profile {
            Action::Profile
        } else {
            Action::SessionOnly
        }
    }
}
