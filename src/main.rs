// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, build the client, hand it to the UI.
// - Missing credentials abort here, before any request is made.

use std::process::ExitCode;

use clap::Parser;
use naukri_refresh::{ui, ApiClient, Config, CookieStore, Credentials};
use tracing::debug;

mod cli;

use cli::Args;

fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(&args);

    let mut config = Config::from_env();
    if let Some(path) = &args.cookie_file {
        config.cookie_file = path.clone();
    }
    debug!(?config, "configuration loaded");

    let outcome = if args.logout {
        ui::logout(&CookieStore::new(&config.cookie_file))
    } else {
        let credentials = Credentials::resolve(args.user.clone(), args.password.clone())?;
        let mut api = ApiClient::new(&config, credentials)?;
        ui::run(&mut api, &args.action())
    };

    ui::report(&outcome);
    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
